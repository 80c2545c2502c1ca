//! Extractor: turns an uploaded document into plain text.
//!
//! The declared filename resolves once to a `DocumentKind`; each kind maps to a
//! strategy in `STRATEGIES`. All parsing is delegated to libraries, and every
//! failure (including a panic inside a parser) comes back as an `ExtractError`.

mod docx;
mod pdf;
mod txt;

use std::panic;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

/// Suffixes accepted at the upload boundary.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "txt"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: .{0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("{0:?} parser panicked")]
    Panicked(DocumentKind),
}

/// Document type resolved from the declared filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
    Unsupported,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        match suffix(filename).as_str() {
            "pdf" => DocumentKind::Pdf,
            "docx" | "doc" => DocumentKind::Docx,
            "txt" => DocumentKind::Txt,
            _ => DocumentKind::Unsupported,
        }
    }
}

type Strategy = fn(&Path) -> Result<String, ExtractError>;

const STRATEGIES: [(DocumentKind, Strategy); 3] = [
    (DocumentKind::Pdf, pdf::extract),
    (DocumentKind::Docx, docx::extract),
    (DocumentKind::Txt, txt::extract),
];

/// Lowercased text after the last `.`; a name without a dot is its own suffix.
pub fn suffix(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// True when the filename has an extension from `ALLOWED_EXTENSIONS`.
pub fn is_allowed(filename: &str) -> bool {
    filename.contains('.') && ALLOWED_EXTENSIONS.contains(&suffix(filename).as_str())
}

/// Extracts text from the file at `path`, dispatching on `declared_filename`.
///
/// Blocking: callers on the async runtime should wrap this in `spawn_blocking`.
pub fn extract(path: &Path, declared_filename: &str) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_filename(declared_filename);
    let strategy = STRATEGIES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, strategy)| *strategy)
        .ok_or_else(|| ExtractError::Unsupported(suffix(declared_filename)))?;

    let result = panic::catch_unwind(|| strategy(path))
        .unwrap_or_else(|_| Err(ExtractError::Panicked(kind)));

    if let Err(e) = &result {
        warn!("Error reading {kind:?} document '{declared_filename}': {e}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_document_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("cv.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("CV.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("cv.docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("cv.doc"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("notes.v2.txt"), DocumentKind::Txt);
        assert_eq!(DocumentKind::from_filename("cv.rtf"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_filename("pdf"), DocumentKind::Pdf);
    }

    #[test]
    fn test_is_allowed_requires_a_dot() {
        assert!(is_allowed("resume.Docx"));
        assert!(!is_allowed("pdf"));
        assert!(!is_allowed("resume.exe"));
        assert!(!is_allowed(""));
    }

    #[test]
    fn test_unsupported_extension_is_the_empty_outcome() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain words").unwrap();

        let result = extract(file.path(), "resume.rtf");
        assert!(matches!(result, Err(ExtractError::Unsupported(ext)) if ext == "rtf"));
    }

    #[test]
    fn test_dispatch_uses_declared_name_not_path() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"  Senior engineer  ").unwrap();

        let text = extract(file.path(), "resume.TXT").unwrap();
        assert_eq!(text, "  Senior engineer  ");
    }

    #[test]
    fn test_corrupt_documents_fail_without_panicking() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a real document").unwrap();

        assert!(extract(file.path(), "resume.pdf").is_err());
        assert!(extract(file.path(), "resume.docx").is_err());
        assert!(extract(file.path(), "resume.doc").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract(&dir.path().join("gone.txt"), "gone.txt");
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
