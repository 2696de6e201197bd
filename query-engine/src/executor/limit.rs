//! Stops a child executor after a fixed number of rows.

use crate::executor::{BoxedExecutor, Executor, OutputSchema};
use crate::types::Row;
use crate::Result;

pub struct LimitExecutor {
    child: BoxedExecutor,
    limit: usize,
    count: usize,
}

impl LimitExecutor {
    pub fn new(child: BoxedExecutor, limit: usize) -> Self {
        Self { child, limit, count: 0 }
    }
}

impl Executor for LimitExecutor {
    fn schema(&self) -> &OutputSchema {
        self.child.schema()
    }

    fn init(&mut self) -> Result<()> {
        self.count = 0;
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if self.count >= self.limit {
            return Ok(None);
        }
        match self.child.next()? {
            Some(row) => {
                self.count += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }
}
