use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod storage;

use storage::{FsStore, MemoryStore, ObjectStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let store = open_store(&cfg).await?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg, store));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(listener, state, active_connections, shutdown).await
}

/// Open the configured storage backend.
async fn open_store(
    cfg: &config::Config,
) -> Result<Arc<dyn ObjectStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn ObjectStore> = match cfg.storage.backend {
        config::StorageBackend::Fs => {
            Arc::new(FsStore::open(cfg.storage.data_dir.clone()).await?)
        }
        config::StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
