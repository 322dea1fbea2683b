//! Bounded reading of archive files from disk.
//!
//! Uploaded archives are memory-mapped and copied out under [`IOLimits`], so
//! an oversized upload fails up front instead of exhausting memory.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Resource limits for reading archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// Largest archive file that may be opened.
    pub max_file_size: u64,
    /// Total bytes that may be read from one opened file.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024 * 1024, // 1GB
            max_read_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Memory-mapped, budget-enforcing reader over one file.
pub struct SafeReader {
    path: PathBuf,
    // memmap cannot map empty files
    mmap: Option<Mmap>,
    limits: IOLimits,
    bytes_read: u64,
    file_size: u64,
}

impl SafeReader {
    /// Open and map `path`. Fails if the file exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(path = %path.display(), size = file_size, "Opening archive");

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "Archive is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file we just opened.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            bytes_read: 0,
            file_size,
        })
    }

    pub fn size(&self) -> u64 {
        self.file_size
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Copy `len` bytes starting at `offset`, clamped to the end of the file.
    pub fn read_at(&mut self, offset: u64, len: u64) -> Result<Bytes> {
        if self.bytes_read.saturating_add(len) > self.limits.max_read_bytes {
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: self.bytes_read,
            });
        }
        let map = match &self.mmap {
            Some(m) => m,
            None => return Ok(Bytes::new()),
        };
        let offset = offset as usize;
        if offset >= map.len() {
            return Ok(Bytes::new());
        }
        let end = offset.saturating_add(len as usize).min(map.len());
        let out = Bytes::copy_from_slice(&map[offset..end]);
        self.bytes_read += out.len() as u64;
        trace!(path = %self.path.display(), offset, len = out.len(), "Read archive bytes");
        Ok(out)
    }

    /// Copy the whole file.
    pub fn read_all(&mut self) -> Result<Bytes> {
        self.read_at(0, self.file_size)
    }
}

/// Read a complete archive from disk under `limits`.
pub fn read_archive(path: &Path, limits: &IOLimits) -> Result<Bytes> {
    SafeReader::open(path, limits.clone())?.read_all()
}
