use crate::{
    error::{ExecutionError, Result},
    operation::projectors::{Projector, ProjectorState, UpstreamHandle},
    types::Row,
};

/// A linear chain of stages that behaves like a single stage.
///
/// Each stage's downstream is the next one. Starting the chain starts the
/// head, and every stage starts its downstream before itself, so the tail
/// is always ready before rows can reach it.
pub struct ProjectorChain {
    head: Box<dyn Projector>,
    len: usize,
}

impl ProjectorChain {
    pub fn new(mut stages: Vec<Box<dyn Projector>>) -> Result<Self> {
        let len = stages.len();
        let mut tail = stages.pop().ok_or_else(|| ExecutionError::InvalidConfig("empty projector chain".into()))?;
        while let Some(mut stage) = stages.pop() {
            stage.set_downstream(tail)?;
            tail = stage;
        }
        Ok(Self { head: tail, len })
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }
}

impl Projector for ProjectorChain {
    fn state(&self) -> ProjectorState { self.head.state() }

    fn register_upstream(&mut self, upstream: UpstreamHandle) -> Result<()> {
        self.head.register_upstream(upstream)
    }

    fn start_projection(&mut self) -> Result<()> {
        self.head.start_projection()
    }

    fn set_next_row(&mut self, row: Row<'_>) -> Result<bool> {
        self.head.set_next_row(row)
    }

    fn upstream_finished(&mut self) -> Result<()> {
        self.head.upstream_finished()
    }

    fn upstream_failed(&mut self, cause: ExecutionError) -> Result<()> {
        self.head.upstream_failed(cause)
    }
}
