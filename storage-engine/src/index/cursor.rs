//! Forward iteration state over the leaf chain.

use buffer_pool_manager::PageId;

/// `(leaf page id, entry index within that leaf)`. Holds no page: both
/// fields are re-resolved against the page file on every read, so a cursor
/// survives being copied or stashed between reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCursor {
    pub pid: PageId,
    pub eid: usize,
}

impl IndexCursor {
    pub fn new(pid: PageId, eid: usize) -> Self {
        Self { pid, eid }
    }
}
