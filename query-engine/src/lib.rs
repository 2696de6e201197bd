//! Index-aware query engine over the record file and B+Tree secondary
//! index: catalog, expression system, Volcano executors, the index-aware
//! planner, and the loadfile ingest path.
//!
//! # Example
//!
//! ```no_run
//! use query_engine::{col, lit, Database};
//!
//! let db = Database::open("mydb").unwrap();
//! db.create_table("t", true).unwrap();
//! let rows = db.table("t").unwrap()
//!     .filter(col("key").gt(lit(10)))
//!     .collect()
//!     .unwrap();
//! ```

pub mod catalog;
pub mod executor;
pub mod expression;
pub mod loader;
pub mod planner;
pub mod types;
mod database;
mod dataframe;

pub use database::Database;
pub use dataframe::DataFrame;
pub use expression::{col, lit, lit_str, Expression};
pub use planner::{Attr, Op, Predicate, Selector};
pub use types::{Row, Value};

/// A specialized error type for query engine operations.
#[derive(Debug)]
pub enum QueryError {
    /// Table not found in the catalog.
    TableNotFound(String),
    /// Column not found in the row schema.
    ColumnNotFound(String),
    /// Type mismatch evaluating an expression.
    TypeMismatch(String),
    /// A loadfile line didn't match `<int key>,<value>`.
    InvalidFileFormat(String),
    /// Execution error surfaced from an executor.
    ExecutionError(String),
    /// An error from the storage engine (record file or index).
    Storage(storage_engine::StorageError),
    /// An error from the page-file layer.
    Bpm(buffer_pool_manager::BpmError),
    /// An I/O error.
    Io(std::io::Error),
}

impl From<storage_engine::StorageError> for QueryError {
    fn from(err: storage_engine::StorageError) -> Self {
        QueryError::Storage(err)
    }
}

impl From<buffer_pool_manager::BpmError> for QueryError {
    fn from(err: buffer_pool_manager::BpmError) -> Self {
        QueryError::Bpm(err)
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        QueryError::Io(err)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::TableNotFound(name) => write!(f, "table not found: {}", name),
            QueryError::ColumnNotFound(name) => write!(f, "column not found: {}", name),
            QueryError::TypeMismatch(msg) => write!(f, "type mismatch: {}", msg),
            QueryError::InvalidFileFormat(msg) => write!(f, "invalid file format: {}", msg),
            QueryError::ExecutionError(msg) => write!(f, "execution error: {}", msg),
            QueryError::Storage(err) => write!(f, "storage error: {}", err),
            QueryError::Bpm(err) => write!(f, "page file error: {}", err),
            QueryError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for QueryError {}

pub type Result<T> = std::result::Result<T, QueryError>;
