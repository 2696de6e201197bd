//! Volcano-style pull executors: seq scan, index range scan, filter,
//! projection and limit, composed into a tree and driven by `init()` /
//! `next()`.

mod filter;
mod index_scan;
mod limit;
mod projection;
mod seq_scan;

pub use filter::FilterExecutor;
pub use index_scan::IndexRangeScanExecutor;
pub use limit::LimitExecutor;
pub use projection::project_row;
pub use seq_scan::SeqScanExecutor;

use crate::types::Row;
use crate::Result;

/// The output column names produced by an executor.
pub type OutputSchema = Vec<String>;

/// A single node of the executor tree.
///
/// `init()` must be called before the first `next()`, and may be called
/// again to rewind the executor back to its first row.
pub trait Executor {
    fn schema(&self) -> &OutputSchema;
    fn init(&mut self) -> Result<()>;
    fn next(&mut self) -> Result<Option<Row>>;

    fn reset(&mut self) -> Result<()> {
        self.init()
    }
}

pub type BoxedExecutor = Box<dyn Executor>;
