use std::fmt::Debug;

use crate::{operation::Input, types::{Row, Value}};

/// An [`Input`] that is bound to each incoming row.
///
/// The binding lasts for one `set_next_row` call only. Implementations copy
/// whatever they expose, because the row is gone once the call returns.
pub trait CollectExpression: Input + Send + Debug {
    /// Called once before the first row of a pass.
    fn start_collect(&mut self) {}

    fn set_next_row(&mut self, row: Row<'_>);
}

/// Reads the value at a fixed column position. Missing columns read as null.
#[derive(Debug, Clone)]
pub struct InputCollectExpression {
    position: usize,
    current: Value,
}

impl InputCollectExpression {
    pub fn new(position: usize) -> Self {
        Self { position, current: Value::Null }
    }

    pub fn position(&self) -> usize { self.position }
}

impl Input for InputCollectExpression {
    fn value(&self) -> &Value { &self.current }
}

impl CollectExpression for InputCollectExpression {
    fn start_collect(&mut self) {
        self.current = Value::Null;
    }

    fn set_next_row(&mut self, row: Row<'_>) {
        match row.get(self.position) {
            Some(v) => self.current.clone_from(v),
            None => self.current = Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_value_out_of_transient_row() {
        let mut expr = InputCollectExpression::new(1);
        {
            let row = vec![Value::Long(1), Value::text("DE")];
            expr.set_next_row(&row);
        }
        // the row is dropped, the copy survives
        assert_eq!(expr.value(), &Value::text("DE"));
    }

    #[test]
    fn out_of_range_position_reads_null() {
        let mut expr = InputCollectExpression::new(5);
        expr.set_next_row(&[Value::Long(1)]);
        assert!(expr.value().is_null());
    }

    #[test]
    fn start_collect_clears_previous_binding() {
        let mut expr = InputCollectExpression::new(0);
        expr.set_next_row(&[Value::Long(9)]);
        expr.start_collect();
        assert!(expr.value().is_null());
    }
}
