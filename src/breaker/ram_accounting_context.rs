use std::sync::Arc;

use tracing::debug;

use crate::{breaker::CircuitBreaker, error::{ExecutionError, Result}};

/// Per-engine byte counter backed by a shared [`CircuitBreaker`].
///
/// Every increment goes straight to the breaker, so a trip happens exactly
/// when the cumulative total crosses the limit. The claim only grows until
/// [`close`](Self::close), which hands everything back in one step. Dropping
/// an open context closes it.
#[derive(Debug)]
pub struct RamAccountingContext {
    context_name: String,
    breaker: Arc<dyn CircuitBreaker>,
    total_bytes: u64,
    closed: bool,
}

impl RamAccountingContext {
    pub fn new(context_name: &str, breaker: Arc<dyn CircuitBreaker>) -> Self {
        Self {
            context_name: context_name.to_string(),
            breaker,
            total_bytes: 0,
            closed: false,
        }
    }

    pub fn context_name(&self) -> &str { &self.context_name }

    pub fn breaker(&self) -> &Arc<dyn CircuitBreaker> { &self.breaker }

    pub fn total_bytes(&self) -> u64 { self.total_bytes }

    pub fn is_closed(&self) -> bool { self.closed }

    /// Claim `bytes`; on failure nothing is claimed and the local total is
    /// unchanged.
    pub fn add_bytes(&mut self, bytes: u64) -> Result<()> {
        if self.closed {
            return Err(ExecutionError::cancelled(format!(
                "ram accounting context [{}] is closed", self.context_name
            )));
        }
        if bytes == 0 {
            return Ok(());
        }
        self.breaker.add_estimate_bytes_and_maybe_break(bytes, &self.context_name)?;
        self.total_bytes += bytes;
        Ok(())
    }

    /// Release the current claim and start counting from zero again.
    pub fn reset(&mut self) {
        self.release_claim();
        self.closed = false;
    }

    /// Release the claim back to the breaker. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.release_claim();
        self.closed = true;
    }

    fn release_claim(&mut self) {
        if self.total_bytes > 0 {
            debug!(context = %self.context_name, bytes = self.total_bytes, "releasing accounted bytes");
            self.breaker.release(self.total_bytes);
            self.total_bytes = 0;
        }
    }
}

impl Drop for RamAccountingContext {
    fn drop(&mut self) {
        self.close();
    }
}
