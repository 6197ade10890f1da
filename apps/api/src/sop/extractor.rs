//! CV text extraction.
//!
//! Uses [`pdf_extract`] to pull text from an uploaded PDF. The library can panic on
//! malformed input instead of returning an error, so every call is wrapped in
//! [`std::panic::catch_unwind`] and reported as an [`ExtractionError`].

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not read PDF: {0}")]
    Unreadable(String),

    #[error("PDF parser crashed on this document (malformed or unsupported file)")]
    Panicked,

    #[error("PDF extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Extracts the text of every page, in order, and concatenates it.
///
/// `None` means no file was uploaded and yields empty text. Pages without extractable
/// text contribute an empty segment.
pub fn extract_text(pdf: Option<&[u8]>) -> Result<String, ExtractionError> {
    let Some(data) = pdf else {
        return Ok(String::new());
    };

    let pages = extract_pages(data)?;
    debug!("Extracted {} page(s) from uploaded CV", pages.len());
    Ok(pages.concat())
}

/// Runs [`extract_text`] on the blocking pool so the parser does not stall the runtime.
pub async fn extract_text_blocking(pdf: Option<Bytes>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_text(pdf.as_deref())).await?
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Unreadable(e.to_string())),
        Err(_) => Err(ExtractionError::Panicked),
    }
}
