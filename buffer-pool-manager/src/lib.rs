//! Page-file primitives for the B+Tree index and record file.
//!
//! This crate defines the common `PageId`/`PageGuard`/`BufferPoolManager`
//! shapes shared by the storage engine's index and record file, plus a
//! disk-backed implementation. There is no pinning or eviction here: pages
//! are read on demand and written through on drop, which is sufficient for
//! a single-threaded index/record store and keeps a future buffer-pool
//! layer a drop-in replacement behind the same trait.

pub mod api;
pub mod disk_manager;
pub mod page_manager;

pub use api::{BpmError, BufferPoolManager, PageGuard, PageId, INVALID_PAGE_ID, PAGE_SIZE};
pub use disk_manager::DiskManager;
pub use page_manager::DiskPageFile;
