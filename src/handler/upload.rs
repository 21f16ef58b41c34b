//! Multipart upload handling module
//!
//! Pulls the `file` field out of a `multipart/form-data` body. The whole
//! body has already been read by the dispatcher (bounded by
//! `http.max_body_size`), so parsing works over one in-memory buffer.

use hyper::body::Bytes;
use multer::Multipart;

/// The file carried by an upload submission. Exists only for the duration
/// of one POST; the dispatcher turns it into a storage key + payload.
#[derive(Debug)]
pub struct UploadedFile {
    /// Filename exactly as submitted by the client.
    pub filename: String,
    /// Declared content type of the part, if any.
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Upload submissions rejected before any storage call.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadError {
    /// No `file` field carrying an actual file was present.
    MissingFile,
    /// The body could not be parsed as multipart/form-data.
    Malformed(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile => write!(f, "no file attached to the upload"),
            Self::Malformed(message) => write!(f, "malformed upload body: {message}"),
        }
    }
}

/// Extract the first `file` field that is an actual file.
///
/// Plain text fields named `file` are skipped; only a part carrying a
/// filename counts. Returns [`UploadError::MissingFile`] when no such part
/// exists, so the dispatcher can answer 400 without touching the backend.
pub async fn extract_file(
    content_type: Option<&str>,
    body: Bytes,
) -> Result<UploadedFile, UploadError> {
    let boundary = content_type
        .and_then(|value| multer::parse_boundary(value).ok())
        .ok_or(UploadError::MissingFile)?;

    let stream = tokio_stream::once(Ok::<Bytes, std::convert::Infallible>(body));
    let mut multipart = Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Malformed(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let declared_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadError::Malformed(e.to_string()))?;

        return Ok(UploadedFile {
            filename,
            content_type: declared_type,
            data,
        });
    }

    Err(UploadError::MissingFile)
}

/// Build a multipart/form-data body for tests.
#[cfg(test)]
pub fn encode_multipart(
    boundary: &str,
    field_name: &str,
    filename: Option<&str>,
    content_type: &str,
    data: &[u8],
) -> Bytes {
    let disposition = filename.map_or_else(
        || format!("Content-Disposition: form-data; name=\"{field_name}\""),
        |name| {
            format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{name}\"")
        },
    );
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Bytes::from(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "test-boundary-7af2";

    fn multipart_header() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    #[tokio::test]
    async fn test_extracts_file_field() {
        let body = encode_multipart(
            BOUNDARY,
            "file",
            Some("report.pdf"),
            "application/pdf",
            b"%PDF-1.4",
        );
        let uploaded = extract_file(Some(&multipart_header()), body).await.unwrap();

        assert_eq!(uploaded.filename, "report.pdf");
        assert_eq!(uploaded.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(uploaded.data, Bytes::from_static(b"%PDF-1.4"));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let body = encode_multipart(BOUNDARY, "comment", None, "text/plain", b"hello");
        let err = extract_file(Some(&multipart_header()), body)
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::MissingFile);
    }

    #[tokio::test]
    async fn test_text_field_named_file_is_not_a_file() {
        let body = encode_multipart(BOUNDARY, "file", None, "text/plain", b"just text");
        let err = extract_file(Some(&multipart_header()), body)
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::MissingFile);
    }

    #[tokio::test]
    async fn test_non_multipart_content_type() {
        let err = extract_file(Some("application/json"), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::MissingFile);

        let err = extract_file(None, Bytes::new()).await.unwrap_err();
        assert_eq!(err, UploadError::MissingFile);
    }
}
