//! Column projection.
//!
//! Every stage in the executor tree (scan, filter, limit) operates on a
//! full `Row` because predicates may reference either column. Projection
//! only needs to narrow the columns actually returned to the caller, so
//! it isn't a pipeline stage of its own — it's a final mapping applied
//! once a row has cleared the rest of the tree, the same place
//! `DataFrame::collect` and the selector's KEY/VALUE/STAR/COUNT emission
//! both need it.

use crate::expression::Expression;
use crate::types::{Row, Value};
use crate::Result;

/// Evaluates each of `projections` against `row`, in order.
pub fn project_row(row: &Row, projections: &[Expression]) -> Result<Vec<Value>> {
    projections.iter().map(|expr| expr.evaluate(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::col;

    #[test]
    fn projects_selected_columns_in_order() {
        let row = Row::new(7, "seven".to_string());
        let exprs = vec![col("value").bind().unwrap(), col("key").bind().unwrap()];
        let projected = project_row(&row, &exprs).unwrap();
        assert_eq!(projected, vec![Value::Varchar("seven".to_string()), Value::Integer(7)]);
    }
}
