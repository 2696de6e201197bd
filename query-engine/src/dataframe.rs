//! The fluent query-building surface: `.filter().select().limit()
//! .collect()`, always executed as a full scan. This is the ambient
//! programmatic API; `Database::select` is the index-aware entry point
//! built on the planner instead.

use std::sync::Arc;

use storage_engine::RecordLocator;

use crate::catalog::TableInfo;
use crate::executor::{project_row, Executor, FilterExecutor, LimitExecutor, SeqScanExecutor};
use crate::expression::Expression;
use crate::types::Value;
use crate::Result;

pub struct DataFrame {
    table_info: Arc<TableInfo>,
    filter_expr: Option<Expression>,
    projection_exprs: Option<Vec<Expression>>,
    limit: Option<usize>,
}

impl DataFrame {
    pub(crate) fn new(table_info: Arc<TableInfo>) -> Self {
        Self {
            table_info,
            filter_expr: None,
            projection_exprs: None,
            limit: None,
        }
    }

    pub fn filter(mut self, predicate: Expression) -> Self {
        self.filter_expr = Some(predicate);
        self
    }

    /// Projects down to the named columns (`"key"`, `"value"`), in order.
    pub fn select(self, columns: &[&str]) -> Self {
        let exprs = columns.iter().map(|c| Expression::Column(c.to_string())).collect();
        self.select_exprs(exprs)
    }

    pub fn select_exprs(mut self, exprs: Vec<Expression>) -> Self {
        self.projection_exprs = Some(exprs);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Appends `(key, value)` to the table, updating its index if any.
    pub fn insert(&self, key: i32, value: &str) -> Result<RecordLocator> {
        let locator = self.table_info.record_file.append(key, value)?;
        if let Some(index) = &self.table_info.index {
            index.insert(key, locator)?;
        }
        Ok(locator)
    }

    /// Runs the pipeline (scan, optional filter, optional limit), then
    /// projects each surviving row, defaulting to both columns.
    pub fn collect(self) -> Result<Vec<Vec<Value>>> {
        let mut exec: Box<dyn Executor> = Box::new(SeqScanExecutor::new(Arc::clone(&self.table_info.record_file)));

        if let Some(predicate) = self.filter_expr {
            exec = Box::new(FilterExecutor::new(exec, predicate)?);
        }
        if let Some(n) = self.limit {
            exec = Box::new(LimitExecutor::new(exec, n));
        }

        let projections: Vec<Expression> = match self.projection_exprs {
            Some(exprs) => exprs.into_iter().map(|e| e.bind()).collect::<Result<_>>()?,
            None => vec![
                Expression::BoundColumn(0),
                Expression::BoundColumn(1),
            ],
        };

        exec.init()?;
        let mut out = Vec::new();
        while let Some(row) = exec.next()? {
            out.push(project_row(&row, &projections)?);
        }
        Ok(out)
    }

    /// Prints every projected row to standard output, tab-separated.
    pub fn show(self) -> Result<()> {
        for row in self.collect()? {
            let rendered: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            println!("{}", rendered.join("\t"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::expression::{col, lit};

    fn temp_table(name: &str) -> Arc<TableInfo> {
        let dir = format!("/tmp/query_dataframe_{}_{}", name, std::process::id());
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let catalog = Catalog::new(&dir);
        catalog.create_table("t", false).unwrap()
    }

    #[test]
    fn collect_with_no_clauses_returns_every_row() {
        let info = temp_table("collect_all");
        let df = DataFrame::new(info.clone());
        df.insert(1, "a").unwrap();
        df.insert(2, "b").unwrap();

        let rows = DataFrame::new(info).collect().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Value::Integer(1), Value::Varchar("a".to_string())]);
    }

    #[test]
    fn filter_narrows_to_matching_rows() {
        let info = temp_table("filter");
        let df = DataFrame::new(info.clone());
        df.insert(1, "a").unwrap();
        df.insert(2, "b").unwrap();
        df.insert(3, "c").unwrap();

        let rows = DataFrame::new(info).filter(col("key").gt(lit(1))).collect().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn select_projects_a_single_column() {
        let info = temp_table("select");
        let df = DataFrame::new(info.clone());
        df.insert(9, "nine").unwrap();

        let rows = DataFrame::new(info).select(&["value"]).collect().unwrap();
        assert_eq!(rows, vec![vec![Value::Varchar("nine".to_string())]]);
    }

    #[test]
    fn limit_caps_the_row_count() {
        let info = temp_table("limit");
        let df = DataFrame::new(info.clone());
        for k in 0..10 {
            df.insert(k, "x").unwrap();
        }

        let rows = DataFrame::new(info).limit(3).collect().unwrap();
        assert_eq!(rows.len(), 3);
    }
}
