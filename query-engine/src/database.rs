//! The top-level handle: opens a directory of per-table `.tbl`/`.idx`
//! page files and exposes both the fluent `DataFrame` surface and the
//! spec's own `select`/`load` contract on top of it.

use std::sync::Arc;

use storage_engine::RecordLocator;

use crate::catalog::Catalog;
use crate::dataframe::DataFrame;
use crate::loader::load_table;
use crate::planner::{run_select, Predicate, Selector};
use crate::Result;

pub struct Database {
    catalog: Arc<Catalog>,
}

impl Database {
    /// Opens (creating if necessary) the database directory at `path`.
    pub fn open(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        Ok(Self {
            catalog: Arc::new(Catalog::new(path)),
        })
    }

    pub fn create_table(&self, name: &str, with_index: bool) -> Result<()> {
        self.catalog.create_table(name, with_index)?;
        Ok(())
    }

    pub fn table(&self, name: &str) -> Result<DataFrame> {
        let info = self.catalog.get_table(name)?;
        Ok(DataFrame::new(info))
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.list_tables()
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.catalog.drop_table(name)
    }

    /// Appends `(key, value)` to `table` directly, bypassing the loadfile
    /// ingest path — used for programmatic inserts.
    pub fn insert(&self, table: &str, key: i32, value: &str) -> Result<RecordLocator> {
        let info = self.catalog.get_table(table)?;
        let locator = info.record_file.append(key, value)?;
        if let Some(index) = &info.index {
            index.insert(key, locator)?;
        }
        Ok(locator)
    }

    /// The index-aware selector: folds `predicates` into a key range when
    /// possible, falling back to a full scan, and emits one line per row
    /// per `selector` (or a single count line for `Selector::Count`).
    pub fn select(&self, table: &str, selector: Selector, predicates: &[Predicate]) -> Result<Vec<String>> {
        let info = self.catalog.get_table(table)?;
        let exec = crate::planner::plan(&info, selector, predicates)?;
        run_select(exec, selector)
    }

    /// Loads `loadfile_path` into `table`, returning the number of rows
    /// ingested before the first parse failure or the loadfile's end.
    pub fn load(&self, table: &str, loadfile_path: &str) -> Result<u64> {
        let info = self.catalog.get_table(table)?;
        load_table(&info, loadfile_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{col, lit};
    use crate::planner::{Attr, Op};
    use crate::types::Value;

    fn temp_db(name: &str) -> Database {
        let dir = format!("/tmp/query_database_{}_{}", name, std::process::id());
        let _ = std::fs::remove_dir_all(&dir);
        Database::open(&dir).unwrap()
    }

    #[test]
    fn create_insert_and_select_round_trip() {
        let db = temp_db("roundtrip");
        db.create_table("t", true).unwrap();
        db.insert("t", 1, "one").unwrap();
        db.insert("t", 2, "two").unwrap();
        db.insert("t", 3, "three").unwrap();

        let lines = db.select("t", Selector::Star, &[]).unwrap();
        assert_eq!(lines, vec!["1 'one'", "2 'two'", "3 'three'"]);
    }

    #[test]
    fn select_with_a_key_range_uses_the_index() {
        let db = temp_db("range");
        db.create_table("t", true).unwrap();
        for k in 1..=10 {
            db.insert("t", k, &format!("v{}", k)).unwrap();
        }

        let predicates = vec![
            Predicate::new(Attr::Key, Op::Gt, Value::Integer(3)),
            Predicate::new(Attr::Key, Op::Le, Value::Integer(6)),
        ];
        let lines = db.select("t", Selector::Key, &predicates).unwrap();
        assert_eq!(lines, vec!["4", "5", "6"]);
    }

    #[test]
    fn count_selector_emits_a_single_line() {
        let db = temp_db("count");
        db.create_table("t", false).unwrap();
        for k in 0..5 {
            db.insert("t", k, "x").unwrap();
        }
        let lines = db.select("t", Selector::Count, &[]).unwrap();
        assert_eq!(lines, vec!["5"]);
    }

    #[test]
    fn value_only_predicate_still_scans_via_the_index_in_key_order() {
        let db = temp_db("value_only");
        db.create_table("t", true).unwrap();
        db.insert("t", 3, "b").unwrap();
        db.insert("t", 1, "a").unwrap();
        db.insert("t", 2, "b").unwrap();

        let predicates = vec![Predicate::new(Attr::Value, Op::Eq, Value::Varchar("b".to_string()))];
        let lines = db.select("t", Selector::Key, &predicates).unwrap();
        // No key bound narrows the scan, but the index still drives it,
        // so matches come back in ascending key order, not insertion order.
        assert_eq!(lines, vec!["2", "3"]);
    }

    #[test]
    fn ne_only_predicate_falls_back_to_a_full_scan() {
        let db = temp_db("ne_only");
        db.create_table("t", true).unwrap();
        for k in 0..10 {
            db.insert("t", k, "x").unwrap();
        }
        let predicates = vec![Predicate::new(Attr::Key, Op::Ne, Value::Integer(5))];
        let lines = db.select("t", Selector::Count, &predicates).unwrap();
        assert_eq!(lines, vec!["9"]);
    }

    #[test]
    fn contradictory_eq_predicates_yield_an_empty_result() {
        let db = temp_db("contradictory");
        db.create_table("t", true).unwrap();
        for k in 0..10 {
            db.insert("t", k, "x").unwrap();
        }
        let predicates = vec![
            Predicate::new(Attr::Key, Op::Eq, Value::Integer(5)),
            Predicate::new(Attr::Key, Op::Eq, Value::Integer(7)),
        ];
        let lines = db.select("t", Selector::Count, &predicates).unwrap();
        assert_eq!(lines, vec!["0"]);
    }

    #[test]
    fn dataframe_filter_and_collect_matches_select() {
        let db = temp_db("dataframe");
        db.create_table("t", true).unwrap();
        db.insert("t", 1, "a").unwrap();
        db.insert("t", 2, "b").unwrap();

        let rows = db
            .table("t")
            .unwrap()
            .filter(col("key").eq(lit(2)))
            .collect()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], Value::Varchar("b".to_string()));
    }
}
