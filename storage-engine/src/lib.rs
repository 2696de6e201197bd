//! Record file and B+Tree secondary index over a disk-backed page store.
//!
//! Two independent page files back this crate: the record file (flat
//! key/value tuples, addressed by `(page, slot)` locators) and the index
//! file (the B+Tree, addressed by page id alone, with page 0 reserved for
//! `[rootPid, height]` metadata). Neither does its own caching; both sit
//! directly on a `buffer_pool_manager::BufferPoolManager`.

pub mod error;
pub mod index;
pub mod record;
pub mod record_file;

pub use error::{Result, StorageError};
pub use index::{BPlusTree, IndexCursor, TreeMetadata};
pub use record::RecordLocator;
pub use record_file::{RecordFile, RecordFileIter};
