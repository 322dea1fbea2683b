//! Errors raised while reading archives from disk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Archive size of {found} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("Reading would exceed the read limit of {limit} bytes (already read: {current}).")]
    ReadLimitExceeded { limit: u64, current: u64 },

    #[error("An underlying I/O error occurred: {0}")]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
