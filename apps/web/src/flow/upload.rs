//! Upload step: reads the `cv` part, applies the upload guards, and extracts
//! the resume text through a temporary file that never outlives the call.

use std::io::Write;

use anyhow::{anyhow, Context};
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::{self, ExtractError};

pub const UPLOAD_FIELD: &str = "cv";

pub const NO_FILE_MESSAGE: &str = "No file selected.";
pub const UNSUPPORTED_TYPE_MESSAGE: &str =
    "File type not supported. Please upload PDF, DOC, DOCX, or TXT files.";
pub const NO_TEXT_MESSAGE: &str = "Could not extract text from the uploaded file. \
    Please make sure the file contains readable text.";
pub const INVALID_UPLOAD_MESSAGE: &str = "Please upload a valid CV file.";

/// Why an upload did not produce resume text.
#[derive(Debug)]
pub enum UploadError {
    NoFile,
    UnsupportedType,
    NoText,
    Malformed,
    TooLarge,
    Processing(anyhow::Error),
}

impl UploadError {
    /// User-facing message for the guard that failed.
    pub fn message(&self) -> &'static str {
        match self {
            UploadError::NoFile => NO_FILE_MESSAGE,
            UploadError::UnsupportedType => UNSUPPORTED_TYPE_MESSAGE,
            UploadError::NoText => NO_TEXT_MESSAGE,
            UploadError::Malformed => INVALID_UPLOAD_MESSAGE,
            UploadError::TooLarge => crate::errors::TOO_LARGE_MESSAGE,
            UploadError::Processing(_) => crate::errors::UPLOAD_FAILED_MESSAGE,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge => AppError::PayloadTooLarge,
            UploadError::Processing(e) => AppError::Upload(e),
            other => AppError::Validation(other.message().to_string()),
        }
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge
        } else {
            warn!("Malformed multipart upload: {}", err.body_text());
            UploadError::Malformed
        }
    }
}

/// A file part as received.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Resume text ready to be stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedResume {
    pub text: String,
    pub filename: String,
}

/// Runs the whole upload step for a multipart request.
pub async fn receive_resume(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ExtractedResume, UploadError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Upload without a multipart body: {rejection}");
        UploadError::NoFile
    })?;
    let file = read_upload_field(&mut multipart)
        .await?
        .ok_or(UploadError::NoFile)?;
    process_upload(file).await
}

/// Finds the `cv` file part. Parts without a filename are not files.
pub async fn read_upload_field(
    multipart: &mut Multipart,
) -> Result<Option<UploadedFile>, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        return Ok(Some(UploadedFile { filename, bytes }));
    }
    Ok(None)
}

/// Applies the filename guards, then extracts text off the async runtime.
pub async fn process_upload(file: UploadedFile) -> Result<ExtractedResume, UploadError> {
    if file.filename.is_empty() {
        return Err(UploadError::NoFile);
    }
    if !extract::is_allowed(&file.filename) {
        return Err(UploadError::UnsupportedType);
    }

    let filename = secure_filename(&file.filename);
    let worker_filename = filename.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        extract_via_temp_file(&file.bytes, &worker_filename)
    })
    .await
    .map_err(|e| UploadError::Processing(anyhow!("extraction worker failed: {e}")))?
    .map_err(UploadError::Processing)?;

    match outcome {
        Ok(text) if !text.trim().is_empty() => {
            info!("Extracted {} characters from '{filename}'", text.chars().count());
            Ok(ExtractedResume { text, filename })
        }
        _ => Err(UploadError::NoText),
    }
}

/// Writes the upload to a named temporary file, extracts it, and removes the file.
/// The file is removed on every path; the outer error covers temp-file I/O only.
fn extract_via_temp_file(
    bytes: &[u8],
    filename: &str,
) -> anyhow::Result<Result<String, ExtractError>> {
    let mut tmp = tempfile::Builder::new()
        .suffix(&format!("_{filename}"))
        .tempfile()
        .context("creating temporary upload file")?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .context("writing temporary upload file")?;

    let result = extract::extract(tmp.path(), filename);

    tmp.close().context("removing temporary upload file")?;
    Ok(result)
}

/// Reduces a client-supplied filename to a safe ASCII name.
///
/// Path components are dropped, whitespace becomes `_`, only ASCII
/// alphanumerics, `.`, `_` and `-` survive, and leading dots or underscores
/// are stripped. Falls back to `upload.<suffix>` when nothing is left.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');

    if cleaned.is_empty() {
        format!("upload.{}", extract::suffix(name))
    } else {
        cleaned.to_string()
    }
}
