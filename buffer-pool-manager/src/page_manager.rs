//! A write-through, no-eviction `BufferPoolManager` over a `DiskManager`.
//!
//! Pages are never cached: `fetch_page` reads straight from disk and
//! `new_page` extends the file immediately. Each guard owns its own
//! buffer and writes it back on drop. This is the entire "paged file
//! store" the B+Tree index needs — no frame table, no pin counts, no
//! eviction policy, because none of those are goals here.

use super::api::{BpmError, BufferPoolManager, PageGuard, PageId, PAGE_SIZE};
use super::disk_manager::DiskManager;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Disk-backed, non-caching `BufferPoolManager`.
pub struct DiskPageFile {
    disk: Arc<DiskManager>,
}

impl DiskPageFile {
    pub fn new(disk: Arc<DiskManager>) -> Self {
        Self { disk }
    }
}

impl BufferPoolManager for DiskPageFile {
    fn fetch_page(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, BpmError> {
        let mut buf = vec![0u8; PAGE_SIZE];
        self.disk.read_page(page_id, &mut buf)?;
        Ok(Box::new(WriteThroughGuard {
            disk: &self.disk,
            page_id,
            buf,
        }))
    }

    fn new_page(&self) -> Result<Box<dyn PageGuard + '_>, BpmError> {
        let page_id = self.disk.end_page_id()?;
        let buf = vec![0u8; PAGE_SIZE];
        self.disk.write_page(page_id, &buf)?;
        Ok(Box::new(WriteThroughGuard {
            disk: &self.disk,
            page_id,
            buf,
        }))
    }

    fn end_page_id(&self) -> PageId {
        self.disk.end_page_id().unwrap_or(0)
    }

    fn close(&self) -> Result<(), BpmError> {
        self.disk.sync()?;
        Ok(())
    }
}

/// A page guard that writes its buffer back to disk when dropped.
struct WriteThroughGuard<'a> {
    disk: &'a DiskManager,
    page_id: PageId,
    buf: Vec<u8>,
}

impl Deref for WriteThroughGuard<'_> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for WriteThroughGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl PageGuard for WriteThroughGuard<'_> {
    fn page_id(&self) -> PageId {
        self.page_id
    }
}

impl Drop for WriteThroughGuard<'_> {
    fn drop(&mut self) {
        let _ = self.disk.write_page(self.page_id, &self.buf);
    }
}
