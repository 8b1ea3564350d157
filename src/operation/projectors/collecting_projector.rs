use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    error::{ExecutionError, Result},
    operation::projectors::{Projector, ProjectorState, UpstreamHandle},
    types::{Row, Value},
};

#[derive(Debug, Default)]
struct Collected {
    rows: Vec<Vec<Value>>,
    finished: bool,
    failure: Option<ExecutionError>,
}

/// Read side of a [`CollectingProjector`], usable after the projector has
/// been moved into a chain.
#[derive(Debug, Clone, Default)]
pub struct CollectorHandle {
    inner: Arc<Mutex<Collected>>,
}

impl CollectorHandle {
    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rows(&self) -> Vec<Vec<Value>> { self.lock().rows.clone() }

    pub fn take_rows(&self) -> Vec<Vec<Value>> { std::mem::take(&mut self.lock().rows) }

    pub fn row_count(&self) -> usize { self.lock().rows.len() }

    pub fn is_finished(&self) -> bool { self.lock().finished }

    pub fn failure(&self) -> Option<ExecutionError> { self.lock().failure.clone() }
}

/// Terminal stage that keeps every row it receives.
#[derive(Debug)]
pub struct CollectingProjector {
    handle: CollectorHandle,
    upstreams: usize,
    remaining_upstreams: usize,
    state: ProjectorState,
}

impl Default for CollectingProjector {
    fn default() -> Self { Self::new() }
}

impl CollectingProjector {
    pub fn new() -> Self {
        Self {
            handle: CollectorHandle::default(),
            upstreams: 0,
            remaining_upstreams: 0,
            state: ProjectorState::Created,
        }
    }

    pub fn handle(&self) -> CollectorHandle { self.handle.clone() }
}

impl Projector for CollectingProjector {
    fn state(&self) -> ProjectorState { self.state }

    fn register_upstream(&mut self, _upstream: UpstreamHandle) -> Result<()> {
        self.state.require(ProjectorState::Created, "register_upstream")?;
        self.upstreams += 1;
        Ok(())
    }

    fn start_projection(&mut self) -> Result<()> {
        self.state.require(ProjectorState::Created, "start_projection")?;
        self.remaining_upstreams = self.upstreams.max(1);
        self.state = ProjectorState::Started;
        Ok(())
    }

    fn set_next_row(&mut self, row: Row<'_>) -> Result<bool> {
        match self.state {
            ProjectorState::Started => {}
            ProjectorState::Failed => return Ok(false),
            state => return Err(ExecutionError::InvalidProtocolUse { operation: "set_next_row", state }),
        }
        self.handle.lock().rows.push(row.to_vec());
        Ok(true)
    }

    fn upstream_finished(&mut self) -> Result<()> {
        self.state.require(ProjectorState::Started, "upstream_finished")?;
        self.remaining_upstreams -= 1;
        if self.remaining_upstreams == 0 {
            self.state = ProjectorState::Finished;
            self.handle.lock().finished = true;
        }
        Ok(())
    }

    fn upstream_failed(&mut self, cause: ExecutionError) -> Result<()> {
        match self.state {
            ProjectorState::Finished => Err(ExecutionError::InvalidProtocolUse { operation: "upstream_failed", state: self.state }),
            ProjectorState::Failed => Ok(()),
            ProjectorState::Created | ProjectorState::Started => {
                self.state = ProjectorState::Failed;
                let mut collected = self.handle.lock();
                collected.rows.clear();
                collected.failure = Some(cause);
                Ok(())
            }
        }
    }
}
