//! PDF text extraction.
//!
//! `pdf-extract` is synchronous and may panic on malformed input, so decoding runs on
//! the blocking pool and a panic is reported as a decode failure.

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not decode PDF document: {0}")]
    Decode(String),

    #[error("Could not extract text from PDF")]
    EmptyContent,
}

/// Extracts the text of every page, in document order.
///
/// Lines are right-trimmed and runs of blank lines collapse to a single one.
pub async fn extract_text(bytes: Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes))
        .await
        .map_err(|e| ExtractError::Decode(format!("extraction task failed: {e}")))?
}

pub fn extract_text_blocking(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Decode("document is empty".to_string()));
    }

    let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    let raw = match decoded {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(ExtractError::Decode(e.to_string())),
        Err(_) => {
            warn!("PDF decoder panicked on {} byte input", bytes.len());
            return Err(ExtractError::Decode(
                "decoder aborted on malformed document".to_string(),
            ));
        }
    };

    let text = normalize_whitespace(&raw);
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyContent);
    }

    debug!(chars = text.len(), "PDF text extracted");
    Ok(text)
}

fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = false;
    for line in raw.lines().map(str::trim_end) {
        if line.is_empty() {
            if !blank_run && !out.is_empty() {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        blank_run = false;
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}
