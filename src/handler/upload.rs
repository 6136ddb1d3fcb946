//! Multipart upload extraction
//!
//! Buffers the request body under the configured ceiling and pulls the
//! `image` part out of a `multipart/form-data` payload.

use std::io::Cursor;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use multer::Multipart;

use super::error::DiagnoseError;
use crate::logger;

/// Form field carrying the scan
pub const IMAGE_FIELD: &str = "image";

/// Uploaded scan, alive for one request only
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content: Bytes,
    /// Declared filename, informational only
    pub file_name: Option<String>,
    /// Declared content type, informational only
    pub content_type: Option<String>,
}

/// Reject early when `Content-Length` already exceeds the ceiling
pub fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Result<(), DiagnoseError> {
    let Some(content_length) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return Ok(());
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(DiagnoseError::PayloadTooLarge)
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Boundary of a `multipart/form-data` request
pub fn multipart_boundary(headers: &HeaderMap) -> Result<String, DiagnoseError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .ok_or(DiagnoseError::MissingContentType)?
        .to_str()
        .map_err(|_| DiagnoseError::Multipart(multer::Error::NoMultipart))?;
    Ok(multer::parse_boundary(content_type)?)
}

/// Read the whole body, failing once more than `limit` bytes arrive
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, DiagnoseError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(DiagnoseError::PayloadTooLarge)
        }
        Err(e) => Err(DiagnoseError::Body(e.to_string())),
    }
}

/// Extract the first `image` part of a buffered multipart body.
///
/// The part must be a file upload (carry a `filename`). A plain text
/// `image` field counts as missing when empty and is a fault otherwise.
/// The rest of the body is still parsed so that a malformed payload is
/// reported even when the image part itself was readable.
pub async fn extract_image(body: Bytes, boundary: String) -> Result<UploadedFile, DiagnoseError> {
    let mut multipart = Multipart::with_reader(Cursor::new(body), boundary);
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        if image.is_some() || field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let content = field.bytes().await?;
        image = Some(UploadedFile {
            content,
            file_name,
            content_type,
        });
    }

    let file = image.ok_or(DiagnoseError::MissingImage)?;
    if file.file_name.is_none() {
        return Err(if file.content.is_empty() {
            DiagnoseError::MissingImage
        } else {
            DiagnoseError::NotAFile
        });
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::header::HeaderValue;

    const BOUNDARY: &str = "X-SCAN-BOUNDARY";

    fn part(name: &str, file_name: Option<&str>, content: &[u8]) -> Vec<u8> {
        let disposition = match file_name {
            Some(f) => format!("form-data; name=\"{name}\"; filename=\"{f}\""),
            None => format!("form-data; name=\"{name}\""),
        };
        let mut out = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        out.extend_from_slice(content);
        out.extend_from_slice(b"\r\n");
        out
    }

    fn finish(mut body: Vec<u8>) -> Bytes {
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(body)
    }

    #[tokio::test]
    async fn test_extract_image_part() {
        let mut body = part("note", None, b"left hemisphere");
        body.extend(part("image", Some("scan.png"), b"\x89PNG\r\n\x1a\n"));
        let file = extract_image(finish(body), BOUNDARY.to_string())
            .await
            .expect("image part");
        assert_eq!(file.content.as_ref(), b"\x89PNG\r\n\x1a\n");
        assert_eq!(file.file_name.as_deref(), Some("scan.png"));
        assert_eq!(file.content_type.as_deref(), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_first_image_part_wins() {
        let mut body = part("image", Some("a.gif"), b"GIF89a");
        body.extend(part("image", Some("b.png"), b"\x89PNG"));
        let file = extract_image(finish(body), BOUNDARY.to_string())
            .await
            .expect("image part");
        assert_eq!(file.file_name.as_deref(), Some("a.gif"));
    }

    #[tokio::test]
    async fn test_missing_image_part() {
        let body = part("file", Some("scan.png"), b"\x89PNG");
        let err = extract_image(finish(body), BOUNDARY.to_string())
            .await
            .expect_err("no image field");
        assert!(matches!(err, DiagnoseError::MissingImage));
    }

    #[tokio::test]
    async fn test_empty_text_image_field_is_missing() {
        let body = part("image", None, b"");
        let err = extract_image(finish(body), BOUNDARY.to_string())
            .await
            .expect_err("text field is not a file");
        assert!(matches!(err, DiagnoseError::MissingImage));
    }

    #[tokio::test]
    async fn test_text_image_field_is_rejected() {
        let body = part("image", None, b"GIF8hello");
        let err = extract_image(finish(body), BOUNDARY.to_string())
            .await
            .expect_err("text field is not a file");
        assert!(matches!(err, DiagnoseError::NotAFile));
    }

    #[tokio::test]
    async fn test_truncated_body_is_an_error() {
        // No closing boundary
        let body = Bytes::from(part("image", Some("scan.png"), b"\x89PNG"));
        let err = extract_image(body, BOUNDARY.to_string())
            .await
            .expect_err("incomplete stream");
        assert!(matches!(err, DiagnoseError::Multipart(_)));
    }

    #[test]
    fn test_multipart_boundary() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=abc123"),
        );
        assert_eq!(multipart_boundary(&headers).expect("boundary"), "abc123");
    }

    #[test]
    fn test_multipart_boundary_errors() {
        let headers = HeaderMap::new();
        assert!(matches!(
            multipart_boundary(&headers),
            Err(DiagnoseError::MissingContentType)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(matches!(
            multipart_boundary(&headers),
            Err(DiagnoseError::Multipart(_))
        ));
    }

    #[test]
    fn test_check_body_size() {
        let mut headers = HeaderMap::new();
        assert!(check_body_size(&headers, 10).is_ok());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_body_size(&headers, 10).is_ok());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("11"));
        assert!(matches!(
            check_body_size(&headers, 10),
            Err(DiagnoseError::PayloadTooLarge)
        ));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("eleven"));
        assert!(check_body_size(&headers, 10).is_ok());
    }

    #[tokio::test]
    async fn test_read_body_limit() {
        let body = Full::new(Bytes::from_static(b"0123456789"));
        assert_eq!(
            read_body(body, 10).await.expect("within limit").as_ref(),
            b"0123456789"
        );

        let body = Full::new(Bytes::from_static(b"0123456789"));
        assert!(matches!(
            read_body(body, 9).await,
            Err(DiagnoseError::PayloadTooLarge)
        ));
    }
}
