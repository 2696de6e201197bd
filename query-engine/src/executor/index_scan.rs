//! Index range scan: drives the B+Tree cursor across `[low, high]` and
//! reads the underlying record through its locator.
//!
//! This is the access path the planner builds once predicate folding
//! produces a usable key bound, in place of `SeqScanExecutor`.

use std::sync::Arc;

use storage_engine::{BPlusTree, IndexCursor, RecordFile};

use crate::executor::{Executor, OutputSchema};
use crate::types::Row;
use crate::Result;

pub struct IndexRangeScanExecutor {
    index: Arc<BPlusTree>,
    record_file: Arc<RecordFile>,
    schema: OutputSchema,
    low_key: i32,
    high_key: i32,
    needs_value: bool,
    cursor: Option<IndexCursor>,
}

impl IndexRangeScanExecutor {
    /// Scans keys in `[low_key, high_key]`, inclusive on both ends.
    ///
    /// `needs_value` gates the per-row record file dereference: the
    /// planner sets it when the projection is VALUE/STAR or a residual
    /// predicate targets the value column, so a KEY/COUNT-only scan never
    /// touches the record file.
    pub fn new(
        index: Arc<BPlusTree>,
        record_file: Arc<RecordFile>,
        low_key: i32,
        high_key: i32,
        needs_value: bool,
    ) -> Self {
        Self {
            index,
            record_file,
            schema: vec!["key".to_string(), "value".to_string()],
            low_key,
            high_key,
            needs_value,
            cursor: None,
        }
    }
}

impl Executor for IndexRangeScanExecutor {
    fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        let (cursor, _found) = self.index.locate(self.low_key)?;
        self.cursor = Some(cursor);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        loop {
            let cursor = match self.cursor {
                Some(c) => c,
                None => return Ok(None),
            };
            let (key, locator, next_cursor) = match self.index.read_forward(cursor) {
                Ok(entry) => entry,
                Err(storage_engine::StorageError::EndOfTree) => {
                    self.cursor = None;
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            if key > self.high_key {
                self.cursor = None;
                return Ok(None);
            }
            self.cursor = Some(next_cursor);
            let value = if self.needs_value {
                let (_, value) = self.record_file.read(locator)?;
                value
            } else {
                String::new()
            };
            return Ok(Some(Row::new(key, value)));
        }
    }
}
