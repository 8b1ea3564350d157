use std::{borrow::Borrow, mem::size_of};

use crate::types::Value;

/// Owned tuple of GROUP BY values.
///
/// Hashes exactly like `[Value]`, so a map keyed by `GroupKey` can be probed
/// with a borrowed slice and the key is only copied for new groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<Value>);

impl GroupKey {
    pub fn new(values: Vec<Value>) -> Self { Self(values) }

    pub fn values(&self) -> &[Value] { &self.0 }

    pub fn into_values(self) -> Vec<Value> { self.0 }

    /// Heap bytes owned by a key built from `values`.
    pub fn heap_size_of(values: &[Value]) -> usize {
        values.len() * size_of::<Value>() + values.iter().map(Value::heap_size).sum::<usize>()
    }
}

impl Borrow<[Value]> for GroupKey {
    fn borrow(&self) -> &[Value] { &self.0 }
}
