use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    breaker::{CircuitBreaker, MemoryCircuitBreaker, NoopCircuitBreaker},
    error::Result,
};

/// Default budget for the shared query breaker: 512 MiB.
pub const DEFAULT_BREAKER_LIMIT: u64 = 512 * 1024 * 1024;

/// Settings for the node-wide circuit breaker.
///
/// - `name` shows up in every limit error so operators know which setting to
///   raise.
/// - `limit_bytes` of `None` disables the breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSettings {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_limit")]
    pub limit_bytes: Option<u64>,
}

fn default_name() -> String { "query".to_string() }

fn default_limit() -> Option<u64> { Some(DEFAULT_BREAKER_LIMIT) }

impl Default for BreakerSettings {
    fn default() -> Self {
        Self { name: default_name(), limit_bytes: default_limit() }
    }
}

impl BreakerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Breaker with an explicit byte limit.
    pub fn limited(name: &str, limit_bytes: u64) -> Self {
        Self { name: name.to_string(), limit_bytes: Some(limit_bytes) }
    }

    /// Breaker that never trips.
    pub fn unlimited(name: &str) -> Self {
        Self { name: name.to_string(), limit_bytes: None }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the breaker once at startup and share the `Arc` with every
    /// engine instance on the node.
    pub fn build(&self) -> Arc<dyn CircuitBreaker> {
        match self.limit_bytes {
            Some(limit) => Arc::new(MemoryCircuitBreaker::new(&self.name, limit)),
            None => Arc::new(NoopCircuitBreaker::new(&self.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;

    #[test]
    fn defaults() {
        let s = BreakerSettings::default();
        assert_eq!(s.name, "query");
        assert_eq!(s.limit_bytes, Some(DEFAULT_BREAKER_LIMIT));
        assert_eq!(BreakerSettings::from_json("{}").unwrap(), s);
    }

    #[test]
    fn parses_json_and_builds() {
        let s = BreakerSettings::from_json(r#"{ "name": "request", "limit_bytes": 2048 }"#).unwrap();
        let b = s.build();
        assert_eq!(b.name(), "request");
        assert_eq!(b.limit(), Some(2048));

        let unbounded = BreakerSettings::from_json(r#"{ "limit_bytes": null }"#).unwrap();
        assert_eq!(unbounded.build().limit(), None);
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = BreakerSettings::from_json(r#"{ "limit_bytes": "lots" }"#).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidConfig(_)));
    }
}
