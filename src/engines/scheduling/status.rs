use crate::error::{NetControlError, Result};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a run.
///
/// ```text
/// Scheduled ──> Ongoing ──> Completed
///    │  ▲          │  └───> ScheduledToStop ──> Stopped
///    │  └──────────┘ (recovery, shutdown)
///    └──> Stopped
/// ```
///
/// Any non-terminal state may also move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    Scheduled,
    Ongoing,
    ScheduledToStop,
    Completed,
    Stopped,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Stopped | RunStatus::Failed
        )
    }

    pub fn can_transition_to(self, to: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, to),
            (Scheduled, Ongoing)
                | (Scheduled, Stopped)
                | (Scheduled, Failed)
                | (Ongoing, ScheduledToStop)
                | (Ongoing, Completed)
                | (Ongoing, Scheduled)
                | (Ongoing, Failed)
                | (ScheduledToStop, Stopped)
                | (ScheduledToStop, Failed)
        )
    }

    /// The only way statuses change
    pub fn transition(self, to: RunStatus) -> Result<RunStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(NetControlError::InvalidTransition { from: self, to })
        }
    }
}
