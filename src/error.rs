use thiserror::Error;

use crate::{operation::projectors::ProjectorState, types::DataType};

pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Every failure a grouping pass can surface.
///
/// The enum is `Clone` because a failure is returned to the caller of the
/// triggering method *and* forwarded to the downstream stage unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error(
        "[{breaker}] data too large, data for [{label}] would be [{}] which is larger than the limit of [{limit}] bytes (in use: {used}, requested: {requested})",
        .used + .requested
    )]
    ResourceLimitExceeded {
        breaker: String,
        label: String,
        limit: u64,
        used: u64,
        requested: u64,
    },

    #[error("operation cancelled: {reason}")]
    CancellationRequested { reason: String },

    #[error("invalid protocol use: `{operation}` is not allowed in state {state}")]
    InvalidProtocolUse { operation: &'static str, state: ProjectorState },

    #[error("unknown function: {ident}")]
    FunctionNotFound { ident: String },

    #[error("{function}: expected {expected}, got {got:?}")]
    ArgumentMismatch { function: String, expected: String, got: Vec<DataType> },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: DataType, got: DataType },

    #[error("{function}: numeric overflow")]
    NumericOverflow { function: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExecutionError {
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::CancellationRequested { reason: reason.into() }
    }

    /// Fatal kinds abort the query on this node; nothing retries them.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, Self::ResourceLimitExceeded { .. })
    }
}

impl From<serde_json::Error> for ExecutionError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
