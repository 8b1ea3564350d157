use std::{cmp::Ordering, fmt::{self, Display}, mem::size_of};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::operation::aggregation::AggregateState;

/// One typed cell of a row.
///
/// Equality and hashing are value based: doubles go through `OrderedFloat`
/// (NaN equals NaN, `0.0` equals `-0.0`) and text compares by bytes. `Null`
/// is distinct from every typed value but equal to itself, so nulls group
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(OrderedFloat<f64>),
    Text(String),
    /// Opaque accumulator emitted by a PARTIAL step, consumed by a later merge.
    Partial(Box<AggregateState>),
}

impl Value {
    pub fn double(f: f64) -> Self { Value::Double(OrderedFloat(f)) }

    pub fn text(s: impl Into<String>) -> Self { Value::Text(s.into()) }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i as i64),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Long(l) => Some(*l as f64),
            Value::Double(d) => Some(d.into_inner()),
            _ => None,
        }
    }

    /// Conservative retained footprint: the inline enum plus any heap data.
    pub fn estimate_size(&self) -> usize {
        size_of::<Value>() + self.heap_size()
    }

    pub fn heap_size(&self) -> usize {
        match self {
            Value::Text(s) => s.capacity(),
            Value::Partial(state) => state.estimate_size(),
            _ => 0,
        }
    }

    /// Ordering between two values of the same scalar type; `None` when the
    /// kinds differ or either side is null/partial.
    pub fn cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self { Value::Int(i) }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self { Value::Long(l) }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self { Value::double(f) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Double(d) => write!(f, "{}", d.into_inner()),
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Partial(state) => write!(f, "<partial {:?}>", state),
        }
    }
}
