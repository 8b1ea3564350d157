//! Node-local GROUP BY stage for a distributed SQL engine.
//!
//! Rows are pushed into a [`GroupingProjector`] one at a time; it groups them
//! by a key tuple, folds them into incremental aggregates and, once every
//! upstream has finished, pushes one row per group downstream. All memory
//! retained for groups is claimed through a [`RamAccountingContext`] backed by
//! a node-wide [`CircuitBreaker`], so an oversized grouping fails instead of
//! exhausting the process.

pub mod error;
pub use error::{ExecutionError, Result};

pub mod config;
pub use config::BreakerSettings;

pub mod types;
pub use types::{DataType, Row, Value};

pub mod breaker;
pub use breaker::{CircuitBreaker, MemoryCircuitBreaker, NoopCircuitBreaker, RamAccountingContext};

pub mod operation;
pub use operation::{
    CollectExpression, Input, InputBinding, InputCollectExpression, LiteralInput,
    aggregation::{AggregateState, AggregationContext, AggregationFunction, AggregationStep, FunctionIdent, FunctionRegistry},
    projectors::{CollectingProjector, CollectorHandle, GroupingProjector, Projector, ProjectorChain, ProjectorState, UpstreamHandle},
};

pub mod planner;
pub use planner::GroupProjection;
