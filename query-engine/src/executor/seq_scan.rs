//! Full-table scan: the selector's fallback when no predicate yields a
//! usable key range, or the table has no index at all.

use std::sync::Arc;

use storage_engine::{RecordFile, RecordLocator};

use crate::executor::{Executor, OutputSchema};
use crate::types::Row;
use crate::Result;

pub struct SeqScanExecutor {
    record_file: Arc<RecordFile>,
    schema: OutputSchema,
    next_locator: RecordLocator,
}

impl SeqScanExecutor {
    pub fn new(record_file: Arc<RecordFile>) -> Self {
        Self {
            record_file,
            schema: vec!["key".to_string(), "value".to_string()],
            next_locator: RecordLocator::new(0, 0),
        }
    }
}

impl Executor for SeqScanExecutor {
    fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.next_locator = RecordLocator::new(0, 0);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        let mut iter = self.record_file.iter_from(self.next_locator)?;
        match iter.next() {
            Some(item) => {
                let (_, key, value) = item?;
                self.next_locator = iter.peek_next_locator();
                Ok(Some(Row::new(key, value)))
            }
            None => Ok(None),
        }
    }
}
