use crate::{operation::CollectExpression, types::Value};

/// Source of one typed value for the row currently being processed.
pub trait Input {
    fn value(&self) -> &Value;
}

/// Constant input, e.g. the `1` in `SUM(1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralInput {
    value: Value,
}

impl LiteralInput {
    pub fn new(value: impl Into<Value>) -> Self {
        Self { value: value.into() }
    }
}

impl Input for LiteralInput {
    fn value(&self) -> &Value { &self.value }
}

/// How a key column or aggregate argument obtains its value.
///
/// `Collected` points into the engine's collect-expression array so one
/// expression can feed both the key and several aggregates while being bound
/// to the row only once.
#[derive(Debug, Clone, PartialEq)]
pub enum InputBinding {
    Collected(usize),
    Literal(LiteralInput),
}

impl InputBinding {
    pub fn literal(value: impl Into<Value>) -> Self {
        InputBinding::Literal(LiteralInput::new(value))
    }

    pub fn resolve<'a>(&'a self, expressions: &'a [Box<dyn CollectExpression>]) -> &'a Value {
        match self {
            InputBinding::Collected(idx) => expressions[*idx].value(),
            InputBinding::Literal(lit) => lit.value(),
        }
    }

    /// Index of the collect expression this binding reads, if any.
    pub fn expression_index(&self) -> Option<usize> {
        match self {
            InputBinding::Collected(idx) => Some(*idx),
            InputBinding::Literal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::InputCollectExpression;

    #[test]
    fn literal_ignores_rows() {
        let lit = InputBinding::literal(1);
        let exprs: Vec<Box<dyn CollectExpression>> = vec![];
        assert_eq!(lit.resolve(&exprs), &Value::Int(1));
        assert_eq!(lit.expression_index(), None);
    }

    #[test]
    fn collected_reads_bound_expression() {
        let mut exprs: Vec<Box<dyn CollectExpression>> = vec![
            Box::new(InputCollectExpression::new(0)),
            Box::new(InputCollectExpression::new(1)),
        ];
        for e in exprs.iter_mut() {
            e.set_next_row(&[Value::text("a"), Value::Long(3)]);
        }
        assert_eq!(InputBinding::Collected(1).resolve(&exprs), &Value::Long(3));
        assert_eq!(InputBinding::Collected(0).resolve(&exprs), &Value::text("a"));
    }
}
