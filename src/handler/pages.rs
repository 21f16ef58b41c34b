//! HTML page rendering module
//!
//! Renders the management, listing, upload, and result pages. Rendering is
//! pure string building over already-fetched data; no storage calls happen
//! here.

use chrono::{DateTime, Local, Utc};

use crate::storage::keys;
use crate::storage::StoredObject;

/// Stylesheet shared by every page.
const PAGE_STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            padding: 20px;
        }
        .container {
            max-width: 1000px;
            margin: 0 auto;
            background: white;
            border-radius: 15px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
            overflow: hidden;
        }
        .header {
            background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%);
            color: white;
            padding: 30px;
            text-align: center;
        }
        .header h1 { font-size: 2rem; font-weight: 300; margin-bottom: 8px; }
        .content { padding: 30px; }
        .stats {
            background: #f8f9fa;
            padding: 12px 20px;
            border-radius: 10px;
            margin-bottom: 20px;
            border-left: 4px solid #4facfe;
            color: #6c757d;
        }
        .btn {
            display: inline-block;
            padding: 10px 25px;
            border-radius: 25px;
            text-decoration: none;
            font-weight: 500;
            color: white;
            margin: 0 8px 20px 0;
        }
        .btn-upload { background: linear-gradient(135deg, #11998e 0%, #38ef7d 100%); }
        .btn-home { background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%); }
        table { width: 100%; border-collapse: collapse; }
        th {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 14px 12px;
            text-align: left;
            font-weight: 500;
        }
        td { padding: 12px; border-bottom: 1px solid #eee; vertical-align: middle; }
        tr:nth-child(even) { background-color: #f8f9fa; }
        .stored-key { font-size: 0.8rem; color: #6c757d; margin-top: 2px; }
        .action-btn {
            display: inline-block;
            padding: 6px 14px;
            border-radius: 20px;
            text-decoration: none;
            font-size: 0.85rem;
            color: white;
            margin-right: 6px;
        }
        .download-btn { background: #17a2b8; }
        .delete-btn { background: #dc3545; }
        .empty-state { text-align: center; padding: 40px 20px; color: #6c757d; }
        .info-box {
            background: #f8f9fa;
            padding: 18px;
            border-radius: 10px;
            margin-bottom: 25px;
            border-left: 4px solid #38ef7d;
            text-align: left;
        }
        .info-box p { margin: 6px 0; color: #495057; }
        .centered { text-align: center; }
"#;

/// Escape text interpolated into HTML content or attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Human-readable object size: repeated division by 1024 with two-decimal
/// rounding, trailing zeros trimmed. Zero is special-cased to `0 B`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut formatted = format!("{value:.2}");
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }

    format!("{formatted} {}", UNITS[unit])
}

/// Upload timestamp in the server's local timezone.
fn format_timestamp(uploaded: DateTime<Utc>) -> String {
    uploaded
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn page_shell(title: &str, header: &str, subtitle: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{PAGE_STYLE}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{header}</h1>
            <p>{subtitle}</p>
        </div>
        <div class="content">
{content}
        </div>
    </div>
</body>
</html>"#
    )
}

/// One table row per stored object, in backend enumeration order.
fn object_rows(objects: &[StoredObject]) -> String {
    let mut rows = String::new();
    for object in objects {
        let display_name = escape_html(keys::decode(&object.key));
        let stored_key = escape_html(&object.key);
        let encoded_key = urlencoding::encode(&object.key);
        rows.push_str(&format!(
            r#"            <tr>
                <td>
                    <div>{display_name}</div>
                    <div class="stored-key">stored as: {stored_key}</div>
                </td>
                <td>{size}</td>
                <td>{uploaded}</td>
                <td>
                    <a href="/download/{encoded_key}" class="action-btn download-btn">Download</a>
                    <a href="/delete/{encoded_key}" onclick="return confirm('Delete {display_name}?')" class="action-btn delete-btn">Delete</a>
                </td>
            </tr>
"#,
            size = format_size(object.size),
            uploaded = format_timestamp(object.uploaded),
        ));
    }
    rows
}

fn object_table(objects: &[StoredObject]) -> String {
    if objects.is_empty() {
        return r#"        <div class="empty-state">
            <h3>No files yet</h3>
            <p>Use the upload button to store your first file</p>
        </div>"#
            .to_string();
    }

    format!(
        r#"        <table>
            <thead>
                <tr><th>Name</th><th>Size</th><th>Uploaded</th><th>Actions</th></tr>
            </thead>
            <tbody>
{}            </tbody>
        </table>"#,
        object_rows(objects)
    )
}

/// Management page: GET `/`
pub fn render_manager_page(objects: &[StoredObject]) -> String {
    let content = format!(
        r#"        <div class="stats"><p>{count} file(s) stored</p></div>
        <a href="/upload" class="btn btn-upload">Upload new file</a>
{table}"#,
        count = objects.len(),
        table = object_table(objects),
    );
    page_shell(
        "File Manager",
        "File Manager",
        "Bucket storage front end",
        &content,
    )
}

/// Alternate listing page: GET `/files`
pub fn render_listing_page(objects: &[StoredObject]) -> String {
    let content = format!(
        r#"        <div class="stats"><p>{count} file(s) stored</p></div>
        <a href="/upload" class="btn btn-upload">Upload file</a>
        <a href="/" class="btn btn-home">Back to manager</a>
{table}"#,
        count = objects.len(),
        table = object_table(objects),
    );
    page_shell("File Listing", "File Listing", "All stored objects", &content)
}

/// Upload form: GET `/upload`
pub fn render_upload_form() -> String {
    let content = r#"        <form action="/upload" method="post" enctype="multipart/form-data" class="centered">
            <p style="margin-bottom: 20px;"><input type="file" name="file" required></p>
            <button type="submit" class="btn btn-upload">Upload</button>
        </form>
        <p class="centered"><a href="/">Back to file list</a></p>"#;
    page_shell(
        "Upload File",
        "Upload File",
        "Store a file in the bucket",
        content,
    )
}

/// Upload result page: POST `/upload` success
pub fn render_upload_success(key: &str, size: u64, content_type: Option<&str>) -> String {
    let content = format!(
        r#"        <div class="info-box">
            <p><strong>Stored as:</strong> {key}</p>
            <p><strong>Size:</strong> {size}</p>
            <p><strong>Content type:</strong> {content_type}</p>
        </div>
        <div class="centered">
            <a href="/" class="btn btn-home">View file list</a>
            <a href="/upload" class="btn btn-upload">Upload another</a>
        </div>"#,
        key = escape_html(key),
        size = format_size(size),
        content_type = escape_html(content_type.unwrap_or("unknown")),
    );
    page_shell(
        "Upload Complete",
        "Upload complete",
        "Your file is stored in the bucket",
        &content,
    )
}

/// Delete result page: GET `/delete/<key>` success
pub fn render_delete_success(key: &str) -> String {
    let content = format!(
        r#"        <div class="info-box">
            <p><strong>Deleted:</strong> {key}</p>
        </div>
        <div class="centered">
            <a href="/" class="btn btn-home">Back to file list</a>
            <a href="/upload" class="btn btn-upload">Upload a file</a>
        </div>"#,
        key = escape_html(key),
    );
    page_shell(
        "Delete Complete",
        "Delete complete",
        "The file was removed from the bucket",
        &content,
    )
}

/// 404 page for unmatched routes
pub fn render_not_found_page() -> String {
    let content = r#"        <div class="info-box">
            <p>The page you requested does not exist.</p>
        </div>
        <div class="centered">
            <a href="/" class="btn btn-home">Back to file list</a>
        </div>"#;
    page_shell(
        "Page Not Found",
        "404 - Page not found",
        "Nothing is served at this address",
        content,
    )
}
