use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::operation::aggregation::{ArbitraryState, AvgState, CountState, ExtremaState, SumState};

/// Accumulator for one (group, aggregate) pair. Each function family owns
/// its variant; the engine never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateState {
    Count(CountState),
    Sum(SumState),
    Avg(AvgState),
    Extrema(ExtremaState),
    Arbitrary(ArbitraryState),
}

impl AggregateState {
    /// Heap bytes owned by the state on top of its inline size.
    pub fn heap_size(&self) -> usize {
        match self {
            AggregateState::Extrema(s) => s.heap_size(),
            AggregateState::Arbitrary(s) => s.heap_size(),
            AggregateState::Count(_) | AggregateState::Sum(_) | AggregateState::Avg(_) => 0,
        }
    }

    pub fn estimate_size(&self) -> usize {
        size_of::<AggregateState>() + self.heap_size()
    }

    /// Whether `heap_size` can change while iterating.
    pub fn is_variable_size(&self) -> bool {
        matches!(self, AggregateState::Extrema(_) | AggregateState::Arbitrary(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AggregateState::Count(_) => "count",
            AggregateState::Sum(_) => "sum",
            AggregateState::Avg(_) => "avg",
            AggregateState::Extrema(_) => "min/max",
            AggregateState::Arbitrary(_) => "arbitrary",
        }
    }
}
