//! Defines the common API for page-file implementations.

use std::ops::{Deref, DerefMut};

/// A unique identifier for a page in the database.
///
/// Signed so that `-1` can serve as the "no such page" sentinel without a
/// separate `Option` wrapper at every call site — the B+Tree's sibling and
/// child pointers rely on this directly (see `storage_engine::index`).
pub type PageId = i32;

/// Sentinel for "no page" (end of sibling chain, uninitialized pointer).
pub const INVALID_PAGE_ID: PageId = -1;

/// The size of a single page in bytes.
///
/// Node capacities are derived from this at runtime rather than hardcoded,
/// but every shipped page file reports 1024: the B+Tree's leaf/internal
/// fanout (85/127 entries) and the split scenarios tested against it are
/// only exact at that size.
pub const PAGE_SIZE: usize = 1024;

/// A specialized error type for page-file operations.
#[derive(Debug)]
pub enum BpmError {
    /// An I/O error from the underlying file.
    Io(std::io::Error),
}

impl std::fmt::Display for BpmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BpmError::Io(e) => write!(f, "page file I/O error: {}", e),
        }
    }
}

impl std::error::Error for BpmError {}

impl From<std::io::Error> for BpmError {
    fn from(err: std::io::Error) -> Self {
        BpmError::Io(err)
    }
}

/// A smart pointer over a single page's bytes.
///
/// Provides mutable access to the page's byte data. When the guard is
/// dropped, any writes made through it are flushed back to the page file —
/// there is no dirty bit because there is no cache to justify one.
pub trait PageGuard: Deref<Target = [u8]> + DerefMut {
    /// Returns the ID of the page being held.
    fn page_id(&self) -> PageId;
}

/// The page-file abstraction consumed by the B+Tree index and record file.
///
/// Object-safe so it can be shared as `Arc<dyn BufferPoolManager>` between
/// the index and the record file without either owning the disk handle.
pub trait BufferPoolManager: Send + Sync {
    /// Reads a page from disk into a guard, on demand (no caching).
    fn fetch_page(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, BpmError>;

    /// Allocates a new page at the end of the file and returns it zeroed.
    fn new_page(&self) -> Result<Box<dyn PageGuard + '_>, BpmError>;

    /// Returns one past the highest-allocated page id (0 for a fresh file).
    fn end_page_id(&self) -> PageId;

    /// Flushes and releases the underlying file handle.
    fn close(&self) -> Result<(), BpmError>;
}
