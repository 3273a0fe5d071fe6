use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::pipeline::evaluation::ReportDocument;

pub const FILE_PREFIX: &str = "report_";
pub const FILE_EXTENSION: &str = "pdf";

#[derive(Error, Debug)]
pub enum DocumentStoreError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Invalid report name: {0}")]
    InvalidName(String),

    #[error("Report storage error: {0}")]
    Io(#[from] io::Error),
}

/// Append-only directory of rendered reports, addressed by generated
/// filenames and served under `public_base_url`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    public_base_url: String,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Write `bytes` under a fresh name. Never overwrites an existing file.
    pub fn persist(&self, bytes: &[u8]) -> Result<ReportDocument, DocumentStoreError> {
        fs::create_dir_all(&self.root)?;

        let id = Uuid::new_v4().simple().to_string();
        let filename = format!("{FILE_PREFIX}{id}.{FILE_EXTENSION}");
        let storage_path = self.root.join(&filename);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&storage_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        tracing::info!(
            filename = %filename,
            size_bytes = bytes.len(),
            "Report document stored"
        );

        Ok(ReportDocument {
            public_url: self.public_url(&filename),
            id,
            filename,
            storage_path,
        })
    }

    pub fn read(&self, filename: &str) -> Result<Vec<u8>, DocumentStoreError> {
        if !is_valid_filename(filename) {
            return Err(DocumentStoreError::InvalidName(filename.to_string()));
        }
        match fs::read(self.root.join(filename)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DocumentStoreError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.public_base_url, filename)
    }
}

/// `report_<32 hex>.pdf` and nothing else, so request paths cannot escape
/// the store directory.
pub fn is_valid_filename(filename: &str) -> bool {
    let Some(stem) = filename
        .strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{FILE_EXTENSION}")))
    else {
        return false;
    };
    stem.len() == 32 && stem.bytes().all(|b| b.is_ascii_hexdigit())
}
