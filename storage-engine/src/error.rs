//! Error kinds for the record file and B+Tree index.

use buffer_pool_manager::BpmError;
use std::fmt;

/// The design-level error names used throughout the index and record file.
#[derive(Debug)]
pub enum StorageError {
    /// A node has no room for another entry; recovered locally by splitting.
    NodeFull,
    /// A search found no exact match.
    NoSuchRecord,
    /// A cursor's page id is out of range, or its entry index is past `keyCount`.
    InvalidCursor,
    /// An argument or on-disk page id is invalid.
    InvalidPid,
    /// A record locator is invalid or out of range.
    InvalidRid,
    /// A predicate referenced an attribute the table doesn't have.
    InvalidAttribute,
    /// A loadfile line didn't match `<int key>,<value>`.
    InvalidFileFormat,
    /// Forward iteration has walked off the last leaf.
    EndOfTree,
    /// The underlying page or record file could not be opened.
    FileOpenFailed,
    /// An insert targeted a key that already exists in the tree.
    DuplicateKey,
    /// An I/O error from the underlying page file.
    Io(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NodeFull => write!(f, "node is full"),
            StorageError::NoSuchRecord => write!(f, "no such record"),
            StorageError::InvalidCursor => write!(f, "invalid cursor"),
            StorageError::InvalidPid => write!(f, "invalid page id"),
            StorageError::InvalidRid => write!(f, "invalid record locator"),
            StorageError::InvalidAttribute => write!(f, "invalid attribute"),
            StorageError::InvalidFileFormat => write!(f, "invalid file format"),
            StorageError::EndOfTree => write!(f, "end of tree"),
            StorageError::FileOpenFailed => write!(f, "file open failed"),
            StorageError::DuplicateKey => write!(f, "duplicate key"),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<BpmError> for StorageError {
    fn from(err: BpmError) -> Self {
        match err {
            BpmError::Io(e) => StorageError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
