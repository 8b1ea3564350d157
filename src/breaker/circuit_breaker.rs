use std::{fmt::Debug, sync::atomic::{AtomicU64, Ordering}};

use tracing::warn;

use crate::error::{ExecutionError, Result};

/// Shared byte budget guard.
///
/// One breaker is shared by every engine instance on a node, so all methods
/// take `&self` and must be safe under concurrent calls.
pub trait CircuitBreaker: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// `None` means unbounded.
    fn limit(&self) -> Option<u64>;

    /// Bytes currently claimed through this breaker.
    fn used(&self) -> u64;

    /// Number of times this breaker refused an increment.
    fn trip_count(&self) -> u64;

    /// Claim `bytes`, or fail without claiming anything when the new total
    /// would exceed the limit. Returns the new total on success.
    fn add_estimate_bytes_and_maybe_break(&self, bytes: u64, label: &str) -> Result<u64>;

    /// Give back bytes previously claimed.
    fn release(&self, bytes: u64);
}

#[derive(Debug)]
pub struct MemoryCircuitBreaker {
    name: String,
    limit: u64,
    used: AtomicU64,
    trips: AtomicU64,
}

impl MemoryCircuitBreaker {
    pub fn new(name: &str, limit: u64) -> Self {
        Self {
            name: name.to_string(),
            limit,
            used: AtomicU64::new(0),
            trips: AtomicU64::new(0),
        }
    }
}

impl CircuitBreaker for MemoryCircuitBreaker {
    fn name(&self) -> &str { &self.name }

    fn limit(&self) -> Option<u64> { Some(self.limit) }

    fn used(&self) -> u64 { self.used.load(Ordering::Acquire) }

    fn trip_count(&self) -> u64 { self.trips.load(Ordering::Relaxed) }

    fn add_estimate_bytes_and_maybe_break(&self, bytes: u64, label: &str) -> Result<u64> {
        let mut current = self.used.load(Ordering::Acquire);
        loop {
            let new_used = current.saturating_add(bytes);
            if new_used > self.limit {
                self.trips.fetch_add(1, Ordering::Relaxed);
                warn!(
                    breaker = %self.name,
                    label,
                    limit = self.limit,
                    used = current,
                    requested = bytes,
                    "circuit breaker tripped"
                );
                return Err(ExecutionError::ResourceLimitExceeded {
                    breaker: self.name.clone(),
                    label: label.to_string(),
                    limit: self.limit,
                    used: current,
                    requested: bytes,
                });
            }
            match self.used.compare_exchange_weak(current, new_used, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Ok(new_used),
                Err(actual) => current = actual,
            }
        }
    }

    fn release(&self, bytes: u64) {
        let prev = self.used.fetch_sub(bytes, Ordering::AcqRel);
        debug_assert!(prev >= bytes, "released more bytes than were claimed");
    }
}

/// Breaker that never trips and tracks nothing.
#[derive(Debug)]
pub struct NoopCircuitBreaker {
    name: String,
}

impl NoopCircuitBreaker {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl CircuitBreaker for NoopCircuitBreaker {
    fn name(&self) -> &str { &self.name }

    fn limit(&self) -> Option<u64> { None }

    fn used(&self) -> u64 { 0 }

    fn trip_count(&self) -> u64 { 0 }

    fn add_estimate_bytes_and_maybe_break(&self, _bytes: u64, _label: &str) -> Result<u64> { Ok(0) }

    fn release(&self, _bytes: u64) {}
}
