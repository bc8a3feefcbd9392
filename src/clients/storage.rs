// src/clients/storage.rs

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Directory (and URL segment) source PDFs are stored under.
pub const PDF_PREFIX: &str = "quizzes_pdfs";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Object store for the uploaded source documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the PDF and returns a URL it can be downloaded from.
    async fn put_pdf(&self, file_name: Option<&str>, bytes: &[u8]) -> Result<String, StorageError>;
}

/// Stores files on local disk; the router serves them under `/files`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: Url,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, StorageError> {
        let mut base = public_base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            root: root.into(),
            public_base: Url::parse(&base)?.join("files/")?,
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

/// Keeps `[A-Za-z0-9._-]`, replaces everything else.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_pdf(&self, file_name: Option<&str>, bytes: &[u8]) -> Result<String, StorageError> {
        let key = format!(
            "{}-{}",
            uuid::Uuid::new_v4(),
            sanitize_file_name(file_name.unwrap_or("document.pdf"))
        );

        let dir = self.root.join(PDF_PREFIX);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&key), bytes).await?;

        let url = self.public_base.join(&format!("{}/{}", PDF_PREFIX, key))?;
        tracing::info!(%url, size = bytes.len(), "Stored source PDF");
        Ok(url.to_string())
    }
}
