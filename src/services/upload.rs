// src/services/upload.rs

use thiserror::Error;

use crate::config::UploadLimits;

pub const PDF_MIME: &str = "application/pdf";

/// Reasons an upload is rejected before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No PDF file uploaded.")]
    Missing,

    #[error("Invalid file type. Only PDF is allowed.")]
    NotPdf { content_type: String },

    #[error("File appears to be empty or corrupted.")]
    Empty,

    #[error(
        "File is too large. Maximum size is {limit_mb}MB. Please try with a smaller file or split your PDF."
    )]
    TooLarge { limit_mb: u64 },

    #[error("Failed to process PDF: {0}. Please ensure your PDF is not corrupted and try again.")]
    Unreadable(String),

    #[error("PDF has too many pages ({pages}). Maximum is {limit} pages.")]
    TooManyPages { pages: usize, limit: usize },
}

/// A file part as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A PDF that passed every upload check.
#[derive(Debug, Clone)]
pub struct ValidatedPdf {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Checks the declared content type.
pub fn check_content_type(content_type: &str) -> Result<(), UploadError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    if essence.eq_ignore_ascii_case(PDF_MIME) {
        Ok(())
    } else {
        Err(UploadError::NotPdf {
            content_type: content_type.to_string(),
        })
    }
}

/// Checks a byte size against the configured ceiling.
pub fn check_size(size: u64, limits: &UploadLimits) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > limits.max_file_size() {
        return Err(UploadError::TooLarge {
            limit_mb: limits.max_upload_mb,
        });
    }
    Ok(())
}

/// Parses the document and returns its page count.
pub fn count_pages(bytes: &[u8]) -> Result<usize, UploadError> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| UploadError::Unreadable(e.to_string()))?;

    let pages = document.get_pages().len();
    if pages == 0 {
        return Err(UploadError::Unreadable("document has no pages".to_string()));
    }
    Ok(pages)
}

/// Runs every upload check in order: type, size, parse, page count.
pub fn validate_upload(file: UploadedFile, limits: &UploadLimits) -> Result<ValidatedPdf, UploadError> {
    check_content_type(&file.content_type)?;
    check_size(file.bytes.len() as u64, limits)?;

    let page_count = count_pages(&file.bytes)?;
    if page_count > limits.max_pages {
        return Err(UploadError::TooManyPages {
            pages: page_count,
            limit: limits.max_pages,
        });
    }

    tracing::debug!(
        file_name = ?file.file_name,
        size = file.bytes.len(),
        page_count,
        "Upload passed validation"
    );

    Ok(ValidatedPdf {
        file_name: file.file_name,
        bytes: file.bytes,
        page_count,
    })
}

/// Accumulates an upload chunk by chunk, failing as soon as the
/// ceiling is passed so the body is never buffered past the limit.
#[derive(Debug)]
pub struct UploadBuffer {
    bytes: Vec<u8>,
    limit: u64,
    limit_mb: u64,
}

impl UploadBuffer {
    pub fn new(limits: &UploadLimits) -> Self {
        Self {
            bytes: Vec::new(),
            limit: limits.max_file_size(),
            limit_mb: limits.max_upload_mb,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        if (self.bytes.len() + chunk.len()) as u64 > self.limit {
            return Err(UploadError::TooLarge {
                limit_mb: self.limit_mb,
            });
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
