//! Flat key/value tuple storage addressed by `(page, slot)` locators.
//!
//! Records are packed into slotted pages: a small header tracks how many
//! slots are in use and how much free space remains, a slot directory
//! grows forward from the header, and record bytes are packed backward
//! from the end of the page, decoded through safe byte-slice accessors
//! instead of raw pointer casts.

use std::sync::{Arc, Mutex};

use buffer_pool_manager::{BufferPoolManager, PageGuard, PageId, PAGE_SIZE};

use crate::error::{Result, StorageError};
use crate::record::RecordLocator;

const HEADER_LEN: usize = 4;
const SLOT_LEN: usize = 4;

fn read_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

fn write_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

fn read_i32(buf: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn slot_count(buf: &[u8]) -> u16 {
    read_u16(buf, 0)
}

fn free_offset(buf: &[u8]) -> u16 {
    read_u16(buf, 2)
}

fn init_page(buf: &mut [u8]) {
    write_u16(buf, 0, 0);
    write_u16(buf, 2, PAGE_SIZE as u16);
}

fn slot_entry(buf: &[u8], slot_id: u16) -> (u16, u16) {
    let off = HEADER_LEN + slot_id as usize * SLOT_LEN;
    (read_u16(buf, off), read_u16(buf, off + 2))
}

fn write_slot_entry(buf: &mut [u8], slot_id: u16, record_off: u16, record_len: u16) {
    let off = HEADER_LEN + slot_id as usize * SLOT_LEN;
    write_u16(buf, off, record_off);
    write_u16(buf, off + 2, record_len);
}

fn encode_record(key: i32, value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 2 + value.len());
    out.extend_from_slice(&key.to_le_bytes());
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    out
}

fn decode_record(buf: &[u8], off: u16, len: u16) -> (i32, String) {
    let off = off as usize;
    let key = read_i32(buf, off);
    let val_len = read_u16(buf, off + 4) as usize;
    debug_assert_eq!(len as usize, 6 + val_len);
    let value = String::from_utf8_lossy(&buf[off + 6..off + 6 + val_len]).into_owned();
    (key, value)
}

/// Flat record storage: a sequence of slotted pages, each packing records
/// back-to-front while its slot directory grows front-to-back.
pub struct RecordFile {
    bpm: Arc<dyn BufferPoolManager>,
    append_page: Mutex<PageId>,
}

impl RecordFile {
    /// Opens the record file backed by `bpm`, initializing page 0 when fresh.
    pub fn open(bpm: Arc<dyn BufferPoolManager>) -> Result<Self> {
        let append_page = if bpm.end_page_id() == 0 {
            let mut guard = bpm.new_page()?;
            init_page(&mut guard);
            guard.page_id()
        } else {
            bpm.end_page_id() - 1
        };
        Ok(Self {
            bpm,
            append_page: Mutex::new(append_page),
        })
    }

    /// One past the last appended record: `(last page, slot_count)`.
    pub fn end_locator(&self) -> Result<RecordLocator> {
        let pid = *self.append_page.lock().unwrap();
        let guard = self.bpm.fetch_page(pid)?;
        Ok(RecordLocator::new(pid, slot_count(&guard) as i32))
    }

    /// Reads the record at `locator`.
    pub fn read(&self, locator: RecordLocator) -> Result<(i32, String)> {
        if locator.is_absent() {
            return Err(StorageError::InvalidRid);
        }
        let guard = self.bpm.fetch_page(locator.page_id)?;
        let count = slot_count(&guard);
        if locator.slot_id < 0 || locator.slot_id as u16 >= count {
            return Err(StorageError::InvalidRid);
        }
        let (off, len) = slot_entry(&guard, locator.slot_id as u16);
        Ok(decode_record(&guard, off, len))
    }

    /// Appends `(key, value)`, returning its locator. Moves to a fresh page
    /// when the current append page has no room for the new record.
    pub fn append(&self, key: i32, value: &str) -> Result<RecordLocator> {
        let record = encode_record(key, value);
        let needed = record.len();

        let mut append_page = self.append_page.lock().unwrap();
        let mut guard = self.bpm.fetch_page(*append_page)?;

        let count = slot_count(&guard);
        let free = free_offset(&guard) as usize;
        let slot_dir_end = HEADER_LEN + (count as usize + 1) * SLOT_LEN;

        if slot_dir_end + needed > free {
            drop(guard);
            let mut new_guard = self.bpm.new_page()?;
            init_page(&mut new_guard);
            *append_page = new_guard.page_id();
            guard = new_guard;
        }

        let count = slot_count(&guard);
        let free = free_offset(&guard) as usize;
        let new_free = free - needed;
        guard[new_free..free].copy_from_slice(&record);
        write_slot_entry(&mut guard, count, new_free as u16, needed as u16);
        write_u16(&mut guard, 0, count + 1);
        write_u16(&mut guard, 2, new_free as u16);

        Ok(RecordLocator::new(guard.page_id(), count as i32))
    }

    /// Flushes and releases the underlying page file.
    pub fn close(&self) -> Result<()> {
        self.bpm.close()?;
        Ok(())
    }

    /// A forward iterator over every record, in locator order.
    pub fn iter(&self) -> Result<RecordFileIter<'_>> {
        self.iter_from(RecordLocator::new(0, 0))
    }

    /// A forward iterator starting at `start`, inclusive. Used to resume a
    /// scan executor across `next()` calls without rescanning from the top.
    pub fn iter_from(&self, start: RecordLocator) -> Result<RecordFileIter<'_>> {
        let end = self.end_locator()?;
        Ok(RecordFileIter {
            file: self,
            cur: start,
            end,
        })
    }
}

/// Forward iterator over all records, in `(page_id, slot_id)` order.
/// Used for the selector's full-table-scan fallback.
pub struct RecordFileIter<'a> {
    file: &'a RecordFile,
    cur: RecordLocator,
    end: RecordLocator,
}

impl<'a> RecordFileIter<'a> {
    /// The locator the next `next()` call would read, valid even after
    /// iteration has ended (in which case it equals the end locator).
    pub fn peek_next_locator(&self) -> RecordLocator {
        self.cur
    }
}

impl<'a> Iterator for RecordFileIter<'a> {
    type Item = Result<(RecordLocator, i32, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur >= self.end {
            return None;
        }
        let locator = self.cur;
        let result = self.file.read(locator);

        let guard = match self.file.bpm.fetch_page(locator.page_id) {
            Ok(g) => g,
            Err(e) => return Some(Err(e.into())),
        };
        let count = slot_count(&guard);
        if locator.slot_id as u16 + 1 < count {
            self.cur.slot_id += 1;
        } else {
            self.cur = RecordLocator::new(locator.page_id + 1, 0);
        }

        Some(result.map(|(key, value)| (locator, key, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buffer_pool_manager::{DiskManager, DiskPageFile};

    fn temp_file(name: &str) -> Arc<dyn BufferPoolManager> {
        let path = format!("/tmp/storage_record_file_{}_{}.tbl", name, std::process::id());
        let _ = std::fs::remove_file(&path);
        let dm = Arc::new(DiskManager::new(&path, true).unwrap());
        Arc::new(DiskPageFile::new(dm))
    }

    #[test]
    fn append_then_read_round_trips() {
        let bpm = temp_file("roundtrip");
        let rf = RecordFile::open(bpm).unwrap();

        let loc1 = rf.append(10, "ten").unwrap();
        let loc2 = rf.append(20, "twenty").unwrap();

        assert_eq!(rf.read(loc1).unwrap(), (10, "ten".to_string()));
        assert_eq!(rf.read(loc2).unwrap(), (20, "twenty".to_string()));
        assert_ne!(loc1, loc2);
    }

    #[test]
    fn iterator_visits_every_record_in_order() {
        let bpm = temp_file("iter");
        let rf = RecordFile::open(bpm).unwrap();

        for k in 0..20 {
            rf.append(k, &format!("v{}", k)).unwrap();
        }

        let collected: Vec<_> = rf
            .iter()
            .unwrap()
            .map(|r| r.unwrap())
            .map(|(_, k, v)| (k, v))
            .collect();

        let expected: Vec<_> = (0..20).map(|k| (k, format!("v{}", k))).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn records_span_pages_once_one_fills_up() {
        let bpm = temp_file("span");
        let rf = RecordFile::open(bpm).unwrap();

        let long_value = "x".repeat(200);
        for k in 0..20 {
            rf.append(k, &long_value).unwrap();
        }

        let locators: Vec<_> = rf.iter().unwrap().map(|r| r.unwrap().0).collect();
        let pages: std::collections::HashSet<_> = locators.iter().map(|l| l.page_id).collect();
        assert!(pages.len() > 1);
    }

    #[test]
    fn reading_out_of_range_slot_is_invalid_rid() {
        let bpm = temp_file("invalid_rid");
        let rf = RecordFile::open(bpm).unwrap();
        rf.append(1, "a").unwrap();

        let bad = RecordLocator::new(0, 99);
        assert!(matches!(rf.read(bad), Err(StorageError::InvalidRid)));
    }
}
