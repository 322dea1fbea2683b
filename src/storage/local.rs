//! Filesystem-backed upload store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/index.json
//! <root>/<YYYY-MM-DD>/<uuid>_<original name>
//! ```

use crate::io::{read_archive, IOLimits};
use crate::storage::{sanitize_filename, StorageError, UploadRecord, UploadStore};
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

const INDEX_FILE: &str = "index.json";

pub struct LocalUploadStore {
    root: PathBuf,
    limits: IOLimits,
    // Serializes read-modify-write cycles on the index within this process.
    index_lock: Mutex<()>,
}

impl LocalUploadStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            limits: IOLimits::default(),
            index_lock: Mutex::new(()),
        })
    }

    pub fn with_limits(mut self, limits: IOLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.index_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn load_index(&self) -> Result<Vec<UploadRecord>, StorageError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read(&path)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    // Write to a sibling temp file, then rename over the index.
    fn write_index(&self, records: &[UploadRecord]) -> Result<(), StorageError> {
        let tmp = self.root.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, self.index_path())?;
        Ok(())
    }
}

impl UploadStore for LocalUploadStore {
    fn save(
        &self,
        upload_date: NaiveDate,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<UploadRecord, StorageError> {
        if !infer::archive::is_zip(bytes) {
            return Err(StorageError::NotAnArchive {
                name: original_name.to_string(),
            });
        }

        let id = Uuid::new_v4();
        let stored_path = format!(
            "{}/{}_{}",
            upload_date.format("%Y-%m-%d"),
            id,
            sanitize_filename(original_name)
        );
        let full = self.root.join(&stored_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, bytes)?;

        let record = UploadRecord {
            id,
            upload_date,
            orig_filename: original_name.to_string(),
            stored_path,
            created_at: Utc::now(),
            size: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(bytes)),
        };

        let indexed = {
            let _guard = self.lock();
            self.load_index().and_then(|mut index| {
                index.push(record.clone());
                self.write_index(&index)
            })
        };
        if let Err(e) = indexed {
            // No metadata row points at the blob; do not leave it behind.
            if let Err(rm) = fs::remove_file(&full) {
                warn!(id = %id, error = %rm, "Could not remove unindexed archive");
            }
            return Err(e);
        }

        info!(id = %record.id, date = %upload_date, name = original_name, "Stored upload");
        Ok(record)
    }

    fn list_by_date(&self, upload_date: NaiveDate) -> Result<Vec<UploadRecord>, StorageError> {
        let _guard = self.lock();
        let mut records: Vec<UploadRecord> = self
            .load_index()?
            .into_iter()
            .filter(|r| r.upload_date == upload_date)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn dates_with_counts(&self) -> Result<Vec<(NaiveDate, usize)>, StorageError> {
        let _guard = self.lock();
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for record in self.load_index()? {
            *counts.entry(record.upload_date).or_insert(0) += 1;
        }
        Ok(counts.into_iter().rev().collect())
    }

    fn find(&self, id: Uuid) -> Result<Option<UploadRecord>, StorageError> {
        let _guard = self.lock();
        Ok(self.load_index()?.into_iter().find(|r| r.id == id))
    }

    fn fetch(&self, id: Uuid) -> Result<Bytes, StorageError> {
        let record = self.find(id)?.ok_or(StorageError::NotFound(id))?;
        debug!(id = %id, path = %record.stored_path, "Fetching upload");
        Ok(read_archive(&self.root.join(&record.stored_path), &self.limits)?)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let _guard = self.lock();
        let mut index = self.load_index()?;
        let Some(pos) = index.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let record = index.remove(pos);

        // A missing blob must not keep the metadata row alive.
        if let Err(e) = fs::remove_file(self.root.join(&record.stored_path)) {
            warn!(id = %id, error = %e, "Could not remove stored archive");
        }
        self.write_index(&index)?;
        info!(id = %id, "Deleted upload");
        Ok(true)
    }
}
