//! The B+Tree engine: metadata persistence, recursive insert with split
//! propagation, locate, and forward cursor reads.

use std::sync::{Arc, Mutex};

use buffer_pool_manager::{BufferPoolManager, PageGuard, PageId, PAGE_SIZE};

use crate::error::{Result, StorageError};
use crate::index::cursor::IndexCursor;
use crate::index::metadata::TreeMetadata;
use crate::index::node::{internal_capacity, leaf_capacity, InternalNode, LeafNode};
use crate::record::RecordLocator;

/// Reserved page id for the persisted `[rootPid, height]` pair.
const METADATA_PAGE_ID: PageId = 0;

/// A disk-backed B+Tree mapping integer keys to record locators.
///
/// Single-threaded per call: `insert` holds the metadata mutex for its
/// entire recursive descent, which is the "coarse-grained exclusive lock
/// at the tree engine boundary" a multithreaded host is expected to add
/// around the whole public surface rather than latching individual nodes.
pub struct BPlusTree {
    bpm: Arc<dyn BufferPoolManager>,
    meta: Mutex<TreeMetadata>,
}

impl BPlusTree {
    /// Opens the index backed by `bpm`. A fresh (empty) page file is
    /// initialized eagerly: page 0 gets `[rootPid=1, height=0]` and page 1
    /// becomes an empty leaf with sibling `-1`.
    pub fn open(bpm: Arc<dyn BufferPoolManager>) -> Result<Self> {
        let meta = if bpm.end_page_id() == 0 {
            let mut meta_guard = bpm.new_page()?;
            TreeMetadata::FRESH.encode(&mut meta_guard);
            let mut leaf_guard = bpm.new_page()?;
            LeafNode::init_empty(&mut leaf_guard);
            TreeMetadata::FRESH
        } else {
            let guard = bpm.fetch_page(METADATA_PAGE_ID)?;
            TreeMetadata::decode(&guard)
        };
        Ok(Self {
            bpm,
            meta: Mutex::new(meta),
        })
    }

    /// Inserts `(key, locator)`. Fails with `DuplicateKey` if `key` is
    /// already present (see open question on duplicate-key policy).
    pub fn insert(&self, key: i32, locator: RecordLocator) -> Result<()> {
        let mut meta = self.meta.lock().unwrap();
        let promotion = self.insert_rec(meta.root_pid, 0, meta.height, key, locator)?;

        if let Some((promoted_key, sibling_pid)) = promotion {
            let mut new_root_guard = self.bpm.new_page()?;
            let new_root_pid = new_root_guard.page_id();
            InternalNode::initialize_root(&mut new_root_guard, meta.root_pid, promoted_key, sibling_pid);
            meta.root_pid = new_root_pid;
            meta.height += 1;
        }

        let mut meta_guard = self.bpm.fetch_page(METADATA_PAGE_ID)?;
        meta.encode(&mut meta_guard);
        Ok(())
    }

    /// Recursive descent keyed on depth. Returns `Some((promotedKey,
    /// newSiblingPid))` when a split at this level must be inserted into
    /// the parent, `None` otherwise.
    fn insert_rec(
        &self,
        pid: PageId,
        depth: u32,
        height: u32,
        key: i32,
        locator: RecordLocator,
    ) -> Result<Option<(i32, PageId)>> {
        if depth == height {
            let mut guard = self.bpm.fetch_page(pid)?;
            let cap = leaf_capacity(PAGE_SIZE);
            let mut leaf = LeafNode::new(&mut guard, cap);
            match leaf.insert(key, locator) {
                Ok(()) => Ok(None),
                Err(StorageError::NodeFull) => {
                    let mut sib_guard = self.bpm.new_page()?;
                    LeafNode::init_empty(&mut sib_guard);
                    let sib_pid = sib_guard.page_id();
                    let mut sibling = LeafNode::new(&mut sib_guard, cap);
                    let sibling_key = leaf.insert_and_split(key, locator, &mut sibling)?;
                    leaf.set_next_ptr(sib_pid)?;
                    Ok(Some((sibling_key, sib_pid)))
                }
                Err(e) => Err(e),
            }
        } else {
            let child_pid = {
                let mut guard = self.bpm.fetch_page(pid)?;
                let internal = InternalNode::new(&mut guard, internal_capacity(PAGE_SIZE));
                internal.locate_child_ptr(key)
            };

            match self.insert_rec(child_pid, depth + 1, height, key, locator)? {
                None => Ok(None),
                Some((k2, p2)) => {
                    let cap = internal_capacity(PAGE_SIZE);
                    let mut guard = self.bpm.fetch_page(pid)?;
                    let mut internal = InternalNode::new(&mut guard, cap);
                    match internal.insert(k2, p2) {
                        Ok(()) => Ok(None),
                        Err(StorageError::NodeFull) => {
                            let mut sib_guard = self.bpm.new_page()?;
                            InternalNode::init_empty(&mut sib_guard);
                            let sib_pid = sib_guard.page_id();
                            let mut sibling = InternalNode::new(&mut sib_guard, cap);
                            let mid_key = internal.insert_and_split(k2, p2, &mut sibling)?;
                            Ok(Some((mid_key, sib_pid)))
                        }
                        Err(e) => Err(e),
                    }
                }
            }
        }
    }

    /// Descends from the root through `height` internal nodes, then
    /// locates within the destination leaf. Returns the cursor and whether
    /// `search_key` was found exactly.
    pub fn locate(&self, search_key: i32) -> Result<(IndexCursor, bool)> {
        let meta = self.meta.lock().unwrap();
        let mut pid = meta.root_pid;
        for _ in 0..meta.height {
            let mut guard = self.bpm.fetch_page(pid)?;
            let internal = InternalNode::new(&mut guard, internal_capacity(PAGE_SIZE));
            pid = internal.locate_child_ptr(search_key);
        }
        let mut guard = self.bpm.fetch_page(pid)?;
        let leaf = LeafNode::new(&mut guard, leaf_capacity(PAGE_SIZE));
        let (eid, found) = leaf.locate(search_key);
        Ok((IndexCursor::new(pid, eid), found))
    }

    /// Reads the entry at `cursor` and returns it along with the next
    /// cursor. Fails with `EndOfTree` once iteration has walked off the
    /// last leaf, `InvalidCursor` for an out-of-range page id.
    ///
    /// `locate` can legitimately return a cursor with `eid == keyCount`
    /// (the search key exceeded every key in that leaf); such a cursor
    /// carries no entry of its own, so it is normalized forward onto the
    /// next leaf before anything is read.
    pub fn read_forward(&self, cursor: IndexCursor) -> Result<(i32, RecordLocator, IndexCursor)> {
        let mut cursor = cursor;
        loop {
            if cursor.pid == -1 {
                return Err(StorageError::EndOfTree);
            }
            if cursor.pid < 0 || cursor.pid >= self.bpm.end_page_id() {
                return Err(StorageError::InvalidCursor);
            }
            let mut guard = self.bpm.fetch_page(cursor.pid)?;
            let leaf = LeafNode::new(&mut guard, leaf_capacity(PAGE_SIZE));
            let count = leaf.key_count();
            if cursor.eid >= count {
                cursor = IndexCursor::new(leaf.get_next_ptr(), 0);
                continue;
            }
            let (key, locator) = leaf.read_entry(cursor.eid)?;
            let next = if cursor.eid + 1 < count {
                IndexCursor::new(cursor.pid, cursor.eid + 1)
            } else {
                IndexCursor::new(leaf.get_next_ptr(), 0)
            };
            return Ok((key, locator, next));
        }
    }

    /// The tree's current `(rootPid, height)`.
    pub fn metadata(&self) -> TreeMetadata {
        *self.meta.lock().unwrap()
    }

    /// Flushes metadata and closes the underlying page file.
    pub fn close(&self) -> Result<()> {
        self.bpm.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buffer_pool_manager::{DiskManager, DiskPageFile};

    fn fresh_tree(name: &str) -> BPlusTree {
        let path = format!("/tmp/storage_btree_{}_{}.idx", name, std::process::id());
        let _ = std::fs::remove_file(&path);
        let dm = Arc::new(DiskManager::new(&path, true).unwrap());
        let bpm: Arc<dyn BufferPoolManager> = Arc::new(DiskPageFile::new(dm));
        BPlusTree::open(bpm).unwrap()
    }

    fn collect_forward(tree: &BPlusTree, start_key: i32) -> Vec<(i32, RecordLocator)> {
        let (mut cursor, _) = tree.locate(start_key).unwrap();
        let mut out = Vec::new();
        loop {
            match tree.read_forward(cursor) {
                Ok((k, loc, next)) => {
                    out.push((k, loc));
                    cursor = next;
                }
                Err(StorageError::EndOfTree) => break,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        out
    }

    #[test]
    fn single_leaf_scenario() {
        let tree = fresh_tree("single_leaf");
        tree.insert(10, RecordLocator::new(0, 0)).unwrap();
        tree.insert(5, RecordLocator::new(0, 1)).unwrap();
        tree.insert(20, RecordLocator::new(0, 2)).unwrap();

        assert_eq!(tree.metadata().height, 0);

        let entries = collect_forward(&tree, 5);
        assert_eq!(
            entries,
            vec![
                (5, RecordLocator::new(0, 1)),
                (10, RecordLocator::new(0, 0)),
                (20, RecordLocator::new(0, 2)),
            ]
        );
    }

    #[test]
    fn first_leaf_split_grows_root_to_height_one() {
        let tree = fresh_tree("first_split");
        for k in 1..=85 {
            tree.insert(k, RecordLocator::new(k, 0)).unwrap();
        }
        assert_eq!(tree.metadata().height, 0);
        assert_eq!(tree.metadata().root_pid, 1);

        tree.insert(86, RecordLocator::new(86, 0)).unwrap();
        assert_eq!(tree.metadata().height, 1);
        assert_ne!(tree.metadata().root_pid, 1);

        let entries = collect_forward(&tree, 1);
        assert_eq!(entries.len(), 86);
        let keys: Vec<i32> = entries.iter().map(|(k, _)| *k).collect();
        let expected: Vec<i32> = (1..=86).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn locate_then_read_forward_finds_inserted_key() {
        let tree = fresh_tree("locate");
        for k in [42, 1, 99, 7] {
            tree.insert(k, RecordLocator::new(k, 0)).unwrap();
        }
        let (cursor, found) = tree.locate(42).unwrap();
        assert!(found);
        let (key, locator, _) = tree.read_forward(cursor).unwrap();
        assert_eq!(key, 42);
        assert_eq!(locator, RecordLocator::new(42, 0));
    }

    #[test]
    fn locate_past_every_key_in_a_leaf_reads_forward_into_the_sibling() {
        let tree = fresh_tree("past_end");
        for k in 1..=86 {
            tree.insert(k, RecordLocator::new(k, 0)).unwrap();
        }
        // key=87 exceeds every key in its destination leaf, so `locate`
        // returns eid == keyCount there; `read_forward` must normalize
        // onto the sibling leaf instead of erroring.
        let (cursor, found) = tree.locate(87).unwrap();
        assert!(!found);
        let (key, _, _) = tree.read_forward(cursor).unwrap();
        assert!(key > 86);
    }

    #[test]
    fn locate_past_every_key_in_a_single_leaf_table_ends_the_scan() {
        let tree = fresh_tree("past_end_single_leaf");
        for k in [5, 10, 20] {
            tree.insert(k, RecordLocator::new(k, 0)).unwrap();
        }
        let (cursor, found) = tree.locate(100).unwrap();
        assert!(!found);
        assert!(matches!(tree.read_forward(cursor), Err(StorageError::EndOfTree)));
    }

    #[test]
    fn inserting_duplicate_key_fails() {
        let tree = fresh_tree("duplicate");
        tree.insert(5, RecordLocator::new(0, 0)).unwrap();
        assert!(matches!(
            tree.insert(5, RecordLocator::new(0, 1)),
            Err(StorageError::DuplicateKey)
        ));
    }

    #[test]
    fn many_inserts_build_a_multi_level_tree() {
        let tree = fresh_tree("multi_level");
        for k in 1..=20_000 {
            tree.insert(k, RecordLocator::new(k, 0)).unwrap();
        }
        assert!(tree.metadata().height >= 2);

        let entries = collect_forward(&tree, 1);
        assert_eq!(entries.len(), 20_000);
        for (i, (k, _)) in entries.iter().enumerate() {
            assert_eq!(*k, i as i32 + 1);
        }
    }

    #[test]
    fn metadata_round_trips_across_reopen() {
        let path = format!("/tmp/storage_btree_reopen_{}.idx", std::process::id());
        let _ = std::fs::remove_file(&path);
        let dm = Arc::new(DiskManager::new(&path, true).unwrap());
        let bpm: Arc<dyn BufferPoolManager> = Arc::new(DiskPageFile::new(dm));
        let tree = BPlusTree::open(bpm).unwrap();
        for k in 1..=200 {
            tree.insert(k, RecordLocator::new(k, 0)).unwrap();
        }
        let meta_before = tree.metadata();
        tree.close().unwrap();

        let dm2 = Arc::new(DiskManager::new(&path, false).unwrap());
        let bpm2: Arc<dyn BufferPoolManager> = Arc::new(DiskPageFile::new(dm2));
        let reopened = BPlusTree::open(bpm2).unwrap();
        assert_eq!(reopened.metadata(), meta_before);

        let (cursor, found) = reopened.locate(100).unwrap();
        assert!(found);
        let (key, locator, _) = reopened.read_forward(cursor).unwrap();
        assert_eq!((key, locator), (100, RecordLocator::new(100, 0)));
    }
}
