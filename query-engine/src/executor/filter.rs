//! Applies a residual predicate to rows pulled from a child executor —
//! the attributes a range bound couldn't absorb (e.g. `NEQ`, value-column
//! comparisons when the index is keyed only on the integer key).

use crate::executor::{BoxedExecutor, Executor, OutputSchema};
use crate::expression::Expression;
use crate::types::Value;
use crate::{QueryError, Result};

pub struct FilterExecutor {
    child: BoxedExecutor,
    predicate: Expression,
}

impl FilterExecutor {
    pub fn new(child: BoxedExecutor, predicate: Expression) -> Result<Self> {
        Ok(Self {
            child,
            predicate: predicate.bind()?,
        })
    }
}

impl Executor for FilterExecutor {
    fn schema(&self) -> &OutputSchema {
        self.child.schema()
    }

    fn init(&mut self) -> Result<()> {
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<crate::types::Row>> {
        loop {
            match self.child.next()? {
                Some(row) => match self.predicate.evaluate(&row)? {
                    Value::Integer(i) if i != 0 => return Ok(Some(row)),
                    Value::Integer(_) => continue,
                    other => {
                        return Err(QueryError::TypeMismatch(format!(
                            "predicate must evaluate to a boolean integer, got {:?}",
                            other
                        )))
                    }
                },
                None => return Ok(None),
            }
        }
    }
}
