use std::fmt::{self, Display};

use crate::{
    error::{ExecutionError, Result},
    operation::projectors::UpstreamHandle,
    types::Row,
};

/// Lifecycle of a pipeline stage.
///
/// `Created -> Started -> Finished` or `Created|Started -> Failed`; both
/// `Finished` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectorState {
    Created,
    Started,
    Finished,
    Failed,
}

impl ProjectorState {
    /// Fail with `InvalidProtocolUse` unless the stage is in `expected`.
    pub fn require(self, expected: ProjectorState, operation: &'static str) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(ExecutionError::InvalidProtocolUse { operation, state: self })
        }
    }
}

impl Display for ProjectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectorState::Created => "CREATED",
            ProjectorState::Started => "STARTED",
            ProjectorState::Finished => "FINISHED",
            ProjectorState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// The push protocol every stage speaks, upstream-facing and
/// downstream-facing alike, so stages chain arbitrarily.
///
/// A stage is owned by one thread at a time; nothing here is synchronized.
pub trait Projector: Send {
    fn state(&self) -> ProjectorState;

    /// Record a producer. Only allowed before `start_projection`.
    fn register_upstream(&mut self, upstream: UpstreamHandle) -> Result<()>;

    fn start_projection(&mut self) -> Result<()>;

    /// Feed one row. `Ok(false)` asks the producer to stop sending.
    fn set_next_row(&mut self, row: Row<'_>) -> Result<bool>;

    fn upstream_finished(&mut self) -> Result<()>;

    /// Abort: discard state and forward `cause` downstream unchanged.
    fn upstream_failed(&mut self, cause: ExecutionError) -> Result<()>;

    /// Attach the stage that receives this stage's output. Terminal stages
    /// refuse.
    fn set_downstream(&mut self, _downstream: Box<dyn Projector>) -> Result<()> {
        Err(ExecutionError::InvalidConfig("terminal stage cannot have a downstream".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_actual_state() {
        assert!(ProjectorState::Started.require(ProjectorState::Started, "set_next_row").is_ok());
        let err = ProjectorState::Finished.require(ProjectorState::Started, "upstream_finished").unwrap_err();
        assert_eq!(err, ExecutionError::InvalidProtocolUse {
            operation: "upstream_finished",
            state: ProjectorState::Finished,
        });
    }
}
