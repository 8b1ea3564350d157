use std::{collections::HashMap, mem::size_of};

use crate::{
    operation::{aggregation::AggregateState, projectors::GroupKey},
    types::Value,
};

/// Accumulator slots of one group, one per aggregation context.
pub type Bucket = Vec<AggregateState>;

/// Hash table from group key to bucket.
///
/// A single GROUP BY column is keyed by the bare value; anything else by a
/// [`GroupKey`] tuple (zero columns give one global group with an empty
/// key). The table is owned by exactly one engine and never shared.
#[derive(Debug)]
pub enum Grouper {
    Single(HashMap<Value, Bucket>),
    Many(HashMap<GroupKey, Bucket>),
}

impl Grouper {
    pub fn new(key_count: usize) -> Self {
        if key_count == 1 {
            Grouper::Single(HashMap::new())
        } else {
            Grouper::Many(HashMap::new())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Grouper::Single(m) => m.len(),
            Grouper::Many(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn capacity(&self) -> usize {
        match self {
            Grouper::Single(m) => m.capacity(),
            Grouper::Many(m) => m.capacity(),
        }
    }

    /// The next insert would make the table reallocate.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        match self {
            Grouper::Single(m) => m.reserve(additional),
            Grouper::Many(m) => m.reserve(additional),
        }
    }

    /// Bytes one unit of table capacity costs: the inline entry, its control
    /// byte, and the 1/8 of slots the table keeps empty.
    pub fn slot_size(&self) -> usize {
        let entry = match self {
            Grouper::Single(_) => size_of::<(Value, Bucket)>(),
            Grouper::Many(_) => size_of::<(GroupKey, Bucket)>(),
        };
        (entry + 1) * 8 / 7 + 1
    }

    /// Heap bytes the stored copy of `key` will own.
    pub fn key_heap_size(&self, key: &[Value]) -> usize {
        match self {
            Grouper::Single(_) => key.iter().map(Value::heap_size).sum(),
            Grouper::Many(_) => GroupKey::heap_size_of(key),
        }
    }

    pub fn bucket_mut(&mut self, key: &[Value]) -> Option<&mut Bucket> {
        match self {
            Grouper::Single(m) => m.get_mut(&key[0]),
            Grouper::Many(m) => m.get_mut(key),
        }
    }

    /// Insert a new group; `key` is copied, the bucket moved in whole.
    pub fn insert(&mut self, key: &[Value], bucket: Bucket) {
        match self {
            Grouper::Single(m) => { m.insert(key[0].clone(), bucket); }
            Grouper::Many(m) => { m.insert(GroupKey::new(key.to_vec()), bucket); }
        }
    }

    /// Drain every group as `(key values, bucket)`, in hash order.
    pub fn into_buckets(self) -> Box<dyn Iterator<Item = (Vec<Value>, Bucket)>> {
        match self {
            Grouper::Single(m) => Box::new(m.into_iter().map(|(k, b)| (vec![k], b))),
            Grouper::Many(m) => Box::new(m.into_iter().map(|(k, b)| (k.into_values(), b))),
        }
    }
}
