//! Catalog: table metadata and the record file / index handles behind it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use buffer_pool_manager::{BufferPoolManager, DiskManager, DiskPageFile};
use storage_engine::{BPlusTree, RecordFile};

use crate::{QueryError, Result};

/// A table's on-disk identity and handles.
///
/// `index` is `Some` only for tables opened with indexing enabled — the
/// selector falls back to a full scan over `record_file` whenever it is
/// `None` or the predicate offers no usable bound.
pub struct TableInfo {
    pub name: String,
    pub record_file: Arc<RecordFile>,
    pub index: Option<Arc<BPlusTree>>,
}

fn open_bpm(path: &str) -> Result<Arc<dyn BufferPoolManager>> {
    let dm = Arc::new(DiskManager::new(path, true)?);
    Ok(Arc::new(DiskPageFile::new(dm)))
}

impl TableInfo {
    fn open(name: &str, base_dir: &str, with_index: bool) -> Result<Self> {
        let record_bpm = open_bpm(&format!("{}/{}.tbl", base_dir, name))?;
        let record_file = Arc::new(RecordFile::open(record_bpm)?);

        let index = if with_index {
            let index_bpm = open_bpm(&format!("{}/{}.idx", base_dir, name))?;
            Some(Arc::new(BPlusTree::open(index_bpm)?))
        } else {
            None
        };

        Ok(Self {
            name: name.to_string(),
            record_file,
            index,
        })
    }
}

/// The database catalog: table name to `TableInfo`, backed by a directory
/// of `.tbl`/`.idx` files.
pub struct Catalog {
    base_dir: String,
    tables: RwLock<HashMap<String, Arc<TableInfo>>>,
}

impl Catalog {
    pub fn new(base_dir: &str) -> Self {
        Self {
            base_dir: base_dir.to_string(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Opens (creating files if necessary) a table, registering it in the
    /// catalog under `name`.
    pub fn create_table(&self, name: &str, with_index: bool) -> Result<Arc<TableInfo>> {
        let mut tables = self.tables.write().unwrap();
        if tables.contains_key(name) {
            return Err(QueryError::ExecutionError(format!(
                "table '{}' already exists",
                name
            )));
        }
        let info = Arc::new(TableInfo::open(name, &self.base_dir, with_index)?);
        tables.insert(name.to_string(), info.clone());
        Ok(info)
    }

    /// Looks up a table, opening it from disk on first reference if the
    /// files already exist but the catalog hasn't seen it this session
    /// (e.g. a fresh `Database::open` against an existing directory).
    pub fn get_table(&self, name: &str) -> Result<Arc<TableInfo>> {
        if let Some(info) = self.tables.read().unwrap().get(name) {
            return Ok(info.clone());
        }

        let tbl_path = std::path::Path::new(&self.base_dir).join(format!("{}.tbl", name));
        if !tbl_path.exists() {
            return Err(QueryError::TableNotFound(name.to_string()));
        }
        let with_index = std::path::Path::new(&self.base_dir)
            .join(format!("{}.idx", name))
            .exists();

        let mut tables = self.tables.write().unwrap();
        // Another thread may have opened it while we weren't holding the lock.
        if let Some(info) = tables.get(name) {
            return Ok(info.clone());
        }
        let info = Arc::new(TableInfo::open(name, &self.base_dir, with_index)?);
        tables.insert(name.to_string(), info.clone());
        Ok(info)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().unwrap().keys().cloned().collect()
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.tables
            .write()
            .unwrap()
            .remove(name)
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> String {
        let dir = format!("/tmp/query_catalog_{}_{}", name, std::process::id());
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn creates_and_looks_up_a_table() {
        let dir = temp_dir("create_get");
        let catalog = Catalog::new(&dir);

        let info = catalog.create_table("users", true).unwrap();
        assert_eq!(info.name, "users");
        assert!(info.index.is_some());

        let fetched = catalog.get_table("users").unwrap();
        assert_eq!(fetched.name, "users");

        assert_eq!(catalog.list_tables(), vec!["users".to_string()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unknown_table_is_not_found() {
        let dir = temp_dir("not_found");
        let catalog = Catalog::new(&dir);
        assert!(matches!(
            catalog.get_table("missing"),
            Err(QueryError::TableNotFound(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn table_without_index_has_none() {
        let dir = temp_dir("no_index");
        let catalog = Catalog::new(&dir);
        let info = catalog.create_table("plain", false).unwrap();
        assert!(info.index.is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rediscovers_a_table_left_on_disk_by_an_earlier_catalog() {
        let dir = temp_dir("rediscover");
        {
            let catalog = Catalog::new(&dir);
            catalog.create_table("orders", true).unwrap();
        }

        let reopened = Catalog::new(&dir);
        assert!(reopened.list_tables().is_empty());
        let info = reopened.get_table("orders").unwrap();
        assert_eq!(info.name, "orders");
        assert!(info.index.is_some());
        assert_eq!(reopened.list_tables(), vec!["orders".to_string()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
