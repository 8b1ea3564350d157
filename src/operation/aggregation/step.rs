use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, Result};

/// Where an aggregate's input comes from and what it should emit.
///
/// - `Iter`: raw row values.
/// - `Partial`: an opaque, mergeable accumulator.
/// - `Final`: the fully reduced scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStep {
    Iter,
    Partial,
    Final,
}

impl AggregationStep {
    /// Accepted (from, to) pairs: ITER→FINAL, ITER→PARTIAL, PARTIAL→FINAL,
    /// PARTIAL→PARTIAL.
    pub fn validate(from: AggregationStep, to: AggregationStep) -> Result<()> {
        use AggregationStep::*;
        match (from, to) {
            (Iter, Final) | (Iter, Partial) | (Partial, Final) | (Partial, Partial) => Ok(()),
            _ => Err(ExecutionError::InvalidConfig(format!(
                "unsupported aggregation step {from} -> {to}"
            ))),
        }
    }
}

impl Display for AggregationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationStep::Iter => f.write_str("ITER"),
            AggregationStep::Partial => f.write_str("PARTIAL"),
            AggregationStep::Final => f.write_str("FINAL"),
        }
    }
}
