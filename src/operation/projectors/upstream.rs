use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

/// A producer as seen by the stage it feeds.
///
/// Clones share one cancellation flag, so a stage that fails can tell its
/// producers to stop without holding on to them.
#[derive(Debug, Clone)]
pub struct UpstreamHandle {
    name: String,
    cancelled: Arc<AtomicBool>,
}

impl UpstreamHandle {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), cancelled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
