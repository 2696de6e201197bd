//! Positioned-I/O disk manager backing the index and record page files.

use super::api::{PageId, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;

/// Reads and writes fixed-size pages to a single on-disk file.
///
/// Uses `read_at`/`write_at` so reads and writes don't need to share a
/// seek cursor; with no buffer pool above it, every call goes straight to
/// disk.
#[derive(Debug)]
pub struct DiskManager {
    file: File,
}

impl DiskManager {
    /// Opens (creating if necessary, when `create` is true) the page file
    /// at `path`.
    pub fn new(path: &str, create: bool) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .open(path)?;
        Ok(Self { file })
    }

    /// Reads the page `page_id` into `data`, which must be exactly
    /// `PAGE_SIZE` bytes.
    pub fn read_page(&self, page_id: PageId, data: &mut [u8]) -> io::Result<()> {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        let offset = (page_id as u64) * (PAGE_SIZE as u64);
        self.file.read_exact_at(data, offset)
    }

    /// Writes `data` (exactly `PAGE_SIZE` bytes) to the page `page_id`.
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> io::Result<()> {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        let offset = (page_id as u64) * (PAGE_SIZE as u64);
        self.file.write_all_at(data, offset)
    }

    /// Returns one past the highest page id that has been written, i.e.
    /// `file_len / PAGE_SIZE`. Zero for a fresh file.
    pub fn end_page_id(&self) -> io::Result<PageId> {
        let len = self.file.metadata()?.len();
        Ok((len / PAGE_SIZE as u64) as PageId)
    }

    /// Flushes pending writes to disk.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }
}
