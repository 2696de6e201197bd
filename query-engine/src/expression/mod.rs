//! Expression system for building predicates and literals over rows.
//!
//! Columns are named `"key"` and `"value"`, binding to row indices 0 and 1
//! respectively — the indexed table has exactly these two columns.

use std::cmp::Ordering;

use crate::types::{Row, Value};
use crate::{QueryError, Result};

/// An expression that can be evaluated against a row.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Reference to a column by name (`"key"` or `"value"`).
    Column(String),
    /// Reference to a column by index, after binding.
    BoundColumn(usize),
    /// A literal value.
    Literal(Value),
    /// A binary comparison.
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
}

impl Expression {
    /// Resolves every `Column(name)` to a `BoundColumn(index)`.
    pub fn bind(&self) -> Result<Expression> {
        match self {
            Expression::Column(name) => {
                let index = match name.as_str() {
                    "key" => 0,
                    "value" => 1,
                    other => return Err(QueryError::ColumnNotFound(other.to_string())),
                };
                Ok(Expression::BoundColumn(index))
            }
            Expression::BoundColumn(_) | Expression::Literal(_) => Ok(self.clone()),
            Expression::BinaryOp { left, op, right } => Ok(Expression::BinaryOp {
                left: Box::new(left.bind()?),
                op: *op,
                right: Box::new(right.bind()?),
            }),
        }
    }

    /// Evaluates the (bound) expression against `row`.
    pub fn evaluate(&self, row: &Row) -> Result<Value> {
        match self {
            Expression::Column(name) => Err(QueryError::ExecutionError(format!(
                "unbound column {}: call bind() first",
                name
            ))),
            Expression::BoundColumn(index) => Ok(row.column(*index)),
            Expression::Literal(v) => Ok(v.clone()),
            Expression::BinaryOp { left, op, right } => {
                let l = left.evaluate(row)?;
                let r = right.evaluate(row)?;
                Self::evaluate_binary(&l, *op, &r)
            }
        }
    }

    fn evaluate_binary(left: &Value, op: BinaryOperator, right: &Value) -> Result<Value> {
        use BinaryOperator::*;
        if op == And {
            return match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer((*a != 0 && *b != 0) as i32)),
                _ => Err(QueryError::TypeMismatch("AND requires boolean operands".into())),
            };
        }
        let cmp = left.compare(right).ok_or_else(|| {
            QueryError::TypeMismatch(format!("cannot compare {:?} and {:?}", left, right))
        })?;
        let truth = match op {
            Eq => cmp == Ordering::Equal,
            NotEq => cmp != Ordering::Equal,
            Lt => cmp == Ordering::Less,
            LtEq => cmp != Ordering::Greater,
            Gt => cmp == Ordering::Greater,
            GtEq => cmp != Ordering::Less,
            And => unreachable!("handled above"),
        };
        Ok(Value::Integer(truth as i32))
    }

    pub fn eq(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::Eq, other)
    }
    pub fn not_eq(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::NotEq, other)
    }
    pub fn lt(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::Lt, other)
    }
    pub fn lt_eq(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::LtEq, other)
    }
    pub fn gt(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::Gt, other)
    }
    pub fn gt_eq(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::GtEq, other)
    }
    pub fn and(self, other: Expression) -> Expression {
        binop(self, BinaryOperator::And, other)
    }
}

fn binop(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// A column reference: `col("key")` or `col("value")`.
pub fn col(name: &str) -> Expression {
    Expression::Column(name.to_string())
}

/// An integer literal.
pub fn lit(value: i32) -> Expression {
    Expression::Literal(Value::Integer(value))
}

/// A string literal.
pub fn lit_str(value: &str) -> Expression {
    Expression::Literal(Value::Varchar(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_key_and_value_columns() {
        let bound = col("key").eq(lit(42)).bind().unwrap();
        match bound {
            Expression::BinaryOp { left, .. } => {
                assert!(matches!(*left, Expression::BoundColumn(0)));
            }
            _ => panic!("expected BinaryOp"),
        }
    }

    #[test]
    fn bind_rejects_unknown_column() {
        assert!(matches!(
            col("nope").bind(),
            Err(QueryError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn evaluates_comparisons_against_a_row() {
        let row = Row::new(42, "hello".to_string());
        let bound = col("key").gt(lit(10)).bind().unwrap();
        assert_eq!(bound.evaluate(&row).unwrap(), Value::Integer(1));

        let bound = col("value").eq(lit_str("hello")).bind().unwrap();
        assert_eq!(bound.evaluate(&row).unwrap(), Value::Integer(1));

        let bound = col("key").lt(lit(10)).bind().unwrap();
        assert_eq!(bound.evaluate(&row).unwrap(), Value::Integer(0));
    }

    #[test]
    fn and_combines_boolean_results() {
        let row = Row::new(42, "hello".to_string());
        let bound = col("key").gt(lit(10)).and(col("key").lt(lit(100))).bind().unwrap();
        assert_eq!(bound.evaluate(&row).unwrap(), Value::Integer(1));
    }
}
