//! Storage of uploaded archives and their metadata.
//!
//! The classifier only ever sees bytes; this module is the collaborator that
//! keeps uploads organised by upload date so operators can browse, analyse
//! and delete them later.

pub mod local;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use local::LocalUploadStore;

/// Errors that can occur while storing or retrieving uploads.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{name} is not a ZIP archive")]
    NotAnArchive { name: String },

    #[error("No upload with id {0}")]
    NotFound(Uuid),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read stored archive: {0}")]
    Read(#[from] crate::io::error::IoError),

    #[error("Corrupt upload index: {0}")]
    Index(#[from] serde_json::Error),
}

/// Metadata row for one uploaded archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub upload_date: NaiveDate,
    pub orig_filename: String,
    /// Location relative to the store root.
    pub stored_path: String,
    pub created_at: DateTime<Utc>,
    pub size: u64,
    /// Hex SHA-256 of the archive bytes.
    pub sha256: String,
}

/// Persistence for uploaded archives.
pub trait UploadStore {
    /// Store an archive under `upload_date`.
    fn save(
        &self,
        upload_date: NaiveDate,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<UploadRecord, StorageError>;

    /// Uploads for one date, newest first.
    fn list_by_date(&self, upload_date: NaiveDate) -> Result<Vec<UploadRecord>, StorageError>;

    /// Dates that have uploads with their counts, most recent date first.
    fn dates_with_counts(&self) -> Result<Vec<(NaiveDate, usize)>, StorageError>;

    fn find(&self, id: Uuid) -> Result<Option<UploadRecord>, StorageError>;

    /// Archive bytes for an upload.
    fn fetch(&self, id: Uuid) -> Result<Bytes, StorageError>;

    /// Remove the stored archive (best effort) and its metadata. Returns
    /// whether a record existed.
    fn delete(&self, id: Uuid) -> Result<bool, StorageError>;
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for archives and the metadata index (default: "uploads").
    pub root: std::path::PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: std::path::PathBuf::from("uploads"),
        }
    }
}

/// Make an uploaded filename safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = base
        .replace("..", "_")
        .trim_start_matches('.')
        .chars()
        .map(|c| if c.is_control() || c == ':' { '_' } else { c })
        .collect::<String>();
    if cleaned.trim().is_empty() {
        "upload.zip".to_string()
    } else {
        cleaned
    }
}
