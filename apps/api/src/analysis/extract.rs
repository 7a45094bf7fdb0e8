//! Text extraction for uploaded resumes.
//!
//! Downloaded bytes are written to a transient local file, read back, and
//! parsed (PDF-aware). The transient file is a `NamedTempFile`, removed when
//! it drops at the end of extraction on success and failure alike.

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract text from PDF '{name}': {message}")]
    Pdf { name: String, message: String },

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// PDF if the declared content type says so or the file name ends in `.pdf`.
pub fn is_pdf(content_type: Option<&str>, file_name: &str) -> bool {
    content_type == Some("application/pdf") || file_name.to_ascii_lowercase().ends_with(".pdf")
}

/// Last path segment of a blob key.
pub fn file_name(blob_key: &str) -> &str {
    blob_key.rsplit('/').next().unwrap_or(blob_key)
}

/// Suffix for the transient copy: the blob's extension (`.pdf`), if it is a
/// short alphanumeric one. Blob names can exceed the file-name limit, so the
/// name itself never goes into the path.
fn temp_suffix(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{ext}")
        }
        _ => String::new(),
    }
}

/// Extracts text from a downloaded blob using the system temp directory.
pub async fn extract_downloaded(
    bytes: Bytes,
    blob_key: &str,
    content_type: Option<&str>,
) -> Result<String, ExtractError> {
    extract_downloaded_in(std::env::temp_dir(), bytes, blob_key, content_type).await
}

/// Same as `extract_downloaded`, with the transient copy placed in `temp_dir`.
pub async fn extract_downloaded_in(
    temp_dir: impl AsRef<Path>,
    bytes: Bytes,
    blob_key: &str,
    content_type: Option<&str>,
) -> Result<String, ExtractError> {
    let temp_dir = temp_dir.as_ref().to_path_buf();
    let name = file_name(blob_key).to_string();
    let pdf = is_pdf(content_type, &name);

    // PDF parsing is CPU-bound and synchronous; keep it off the async executor.
    tokio::task::spawn_blocking(move || {
        let mut transient = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(&temp_suffix(&name))
            .tempfile_in(&temp_dir)?;
        transient.write_all(&bytes)?;
        transient.flush()?;
        extract_file(transient.path(), &name, pdf)
    })
    .await
    .map_err(|e| ExtractError::Task(e.to_string()))?
}

/// Reads `path` and returns its text. Non-PDF content is decoded as UTF-8,
/// replacing invalid sequences.
pub fn extract_file(path: &Path, name: &str, pdf: bool) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    if pdf {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf {
            name: name.to_string(),
            message: e.to_string(),
        })
    } else {
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_is_pdf_by_content_type() {
        assert!(is_pdf(Some("application/pdf"), "resume"));
        assert!(!is_pdf(Some("text/plain"), "resume.txt"));
    }

    #[test]
    fn test_is_pdf_by_extension() {
        assert!(is_pdf(None, "abc_resume.pdf"));
        assert!(is_pdf(Some("application/octet-stream"), "CV.PDF"));
        assert!(!is_pdf(None, "resume.pdf.txt"));
    }

    #[test]
    fn test_file_name_strips_prefix() {
        assert_eq!(file_name("uploads/0a1b2c3d4e5f6a7b_cv.pdf"), "0a1b2c3d4e5f6a7b_cv.pdf");
        assert_eq!(file_name("cv.txt"), "cv.txt");
    }

    #[tokio::test]
    async fn test_plain_text_is_returned_and_temp_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let text = extract_downloaded_in(
            dir.path(),
            Bytes::from_static(b"Jane Doe\nRust engineer"),
            "uploads/abc_resume.txt",
            Some("text/plain"),
        )
        .await
        .unwrap();
        assert_eq!(text, "Jane Doe\nRust engineer");
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_temp_suffix_keeps_only_short_extensions() {
        assert_eq!(temp_suffix("0a1b_cv.pdf"), ".pdf");
        assert_eq!(temp_suffix("notes"), "");
        assert_eq!(temp_suffix("weird.p d/f"), "");
        assert_eq!(temp_suffix(&format!("cv.{}", "x".repeat(40))), "");
    }

    #[tokio::test]
    async fn test_overlong_file_name_still_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let key = format!("uploads/0a1b2c3d4e5f6a7b_{}.txt", "r".repeat(300));
        let text = extract_downloaded_in(
            dir.path(),
            Bytes::from_static(b"Jane Doe"),
            &key,
            Some("text/plain"),
        )
        .await
        .unwrap();
        assert_eq!(text, "Jane Doe");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let text = extract_downloaded_in(
            dir.path(),
            Bytes::from_static(b"caf\xff"),
            "uploads/abc_resume.txt",
            None,
        )
        .await
        .unwrap();
        assert_eq!(text, "caf\u{FFFD}");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_fails_and_temp_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_downloaded_in(
            dir.path(),
            Bytes::from_static(b"this is not a pdf"),
            "uploads/abc_resume.pdf",
            Some("application/pdf"),
        )
        .await;
        assert!(result.is_err());
        assert!(dir_is_empty(dir.path()));
    }
}
