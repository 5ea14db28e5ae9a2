//! PDF text extraction wrapper.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("extraction task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Extracts plain text from an in-memory PDF on the blocking pool.
pub async fn extract_pdf_text(bytes: bytes::Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
    })
    .await?
}
