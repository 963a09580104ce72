//! Document text extraction

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::ExtractionError;
use crate::types::MIN_EXTRACTED_CHARS;

/// Turns a document into plain text for the generator.
pub trait TextExtractor: Send + Sync + 'static {
    fn extract(&self, path: &Path) -> impl Future<Output = Result<String, ExtractionError>> + Send;
}

/// Extensions read as binary formats we cannot decode.
const BINARY_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "odt", "epub", "png", "jpg", "jpeg"];

/// Reads UTF-8 text documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if BINARY_EXTENSIONS.contains(&ext.as_str()) {
                return Err(ExtractionError::Unsupported(format!(".{ext}")));
            }
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let raw = String::from_utf8(bytes).map_err(|_| ExtractionError::NotText {
            path: PathBuf::from(path),
        })?;

        let text = normalize_whitespace(&raw);
        let chars = text.chars().count();
        if chars < MIN_EXTRACTED_CHARS {
            return Err(ExtractionError::TooShort {
                chars,
                min: MIN_EXTRACTED_CHARS,
            });
        }

        tracing::debug!(path = %path.display(), chars, "extracted document text");
        Ok(text)
    }
}

/// Collapse runs of spaces and tabs, trim every line and drop blank-line runs,
/// keeping paragraph breaks.
pub fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_pending = false;

    for line in raw.lines() {
        let mut words = line.split_whitespace().peekable();
        if words.peek().is_none() {
            blank_pending = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_pending { "\n\n" } else { "\n" });
        }
        blank_pending = false;

        let mut first = true;
        for word in words {
            if !first {
                out.push(' ');
            }
            out.push_str(word);
            first = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LONG: &str = "La photosynthèse est un processus biologique par lequel les plantes \
                        convertissent la lumière en énergie chimique.";

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  Titre\t\tun  \n\n\n  corps   du texte \r\nfin  ";
        assert_eq!(normalize_whitespace(raw), "Titre un\n\ncorps du texte\nfin");
        assert_eq!(normalize_whitespace(" \n\t\n"), "");
    }

    #[tokio::test]
    async fn test_reads_text_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "  {LONG}  \n").unwrap();

        let text = PlainTextExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(text, LONG);
    }

    #[tokio::test]
    async fn test_rejects_near_empty_document() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "# Titre\n\n").unwrap();

        let err = PlainTextExtractor::new()
            .extract(file.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::TooShort { chars: 7, .. }));
    }

    #[tokio::test]
    async fn test_rejects_pdf_and_binary() {
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract(Path::new("cours.PDF")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Unsupported(ref ext) if ext == ".pdf"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x81]).unwrap();
        let err = extractor.extract(file.path()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NotText { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PlainTextExtractor::new()
            .extract(&dir.path().join("absent.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Read { .. }));
    }
}
