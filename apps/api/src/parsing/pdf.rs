//! PDF text extraction via `pdf-extract`, with the whitespace cleanup ATS-style
//! parsers apply before keyword matching.

use bytes::Bytes;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Only PDF files are accepted")]
    NotPdf,

    #[error("File size exceeds {limit_mb}MB limit")]
    TooLarge { limit_mb: usize },

    #[error("Failed to parse PDF: {0}")]
    Extraction(String),

    #[error("Your resume is not ATS parsable. It appears to be image based.")]
    NoText,

    #[error("PDF extraction worker failed: {0}")]
    Worker(String),
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ParseError::Worker(msg) => {
                AppError::Internal(anyhow::anyhow!("PDF extraction worker failed: {msg}"))
            }
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// Built once at startup; cheap to clone.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    blank_runs: Regex,
    space_runs: Regex,
    max_bytes: usize,
}

impl PdfTextExtractor {
    pub fn new(max_bytes: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            blank_runs: Regex::new(r"\n(?:[ \t]*\n){2,}")?,
            space_runs: Regex::new(r"[ \t]{2,}")?,
            max_bytes,
        })
    }

    /// Validates the upload and returns its cleaned text.
    pub async fn extract(&self, filename: &str, data: Bytes) -> Result<String, ParseError> {
        if !is_pdf_filename(filename) {
            return Err(ParseError::NotPdf);
        }
        if data.len() > self.max_bytes {
            return Err(ParseError::TooLarge {
                limit_mb: self.max_bytes / (1024 * 1024),
            });
        }

        let size = data.len();
        let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| {
                // pdf-extract panics on some malformed files; that is still a bad upload.
                if e.is_panic() {
                    ParseError::Extraction("the file is not a readable PDF".to_string())
                } else {
                    ParseError::Worker(e.to_string())
                }
            })?
            .map_err(|e| ParseError::Extraction(e.to_string()))?;

        let text = self.clean(&raw);
        debug!(bytes = size, chars = text.chars().count(), "PDF text extracted");

        if text.is_empty() {
            return Err(ParseError::NoText);
        }
        Ok(text)
    }

    /// Collapses runs of blank lines to one empty line and runs of spaces to one space.
    pub fn clean(&self, raw: &str) -> String {
        let text = raw.replace("\r\n", "\n");
        let text = self.space_runs.replace_all(&text, " ");
        let text = self.blank_runs.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

fn is_pdf_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}
