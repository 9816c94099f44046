use std::fmt;
use std::time::Duration;

use crate::{ItemId, Progress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the operator to confirm before a run starts.
    RequestStartConfirmation { prompt: String },
    SetControl { mode: ControlMode, label: String },
    SetControlVisible(bool),
    Subscribe { channel: String },
    Unsubscribe { channel: String },
    PublishProgress(Progress),
    /// Trigger the row's save action exactly once.
    Click { item: ItemId },
    /// Deliver `Msg::TimerFired { timer, .. }` after `delay`.
    ArmTimer {
        timer: TimerId,
        purpose: TimerPurpose,
        delay: Duration,
    },
    CancelTimer { timer: TimerId },
    RunEnded(RunSummary),
}

/// Handle of one deferred call. Never reused, so a late firing is recognizable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Step again after skipping a disabled row.
    Retry,
    /// Give up waiting for a confirmation.
    Fallback,
    /// Step after a matched confirmation, letting the host redraw first.
    Advance,
}

/// Which affordance the operator control currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Start,
    Stop,
}

impl ControlMode {
    pub fn style_class(self) -> &'static str {
        match self {
            ControlMode::Start => "btn-primary",
            ControlMode::Stop => "btn-danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The operator pressed stop.
    Operator,
    /// The work queue ran dry.
    Completed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Operator => write!(f, "stopped by operator"),
            StopReason::Completed => write!(f, "completed"),
        }
    }
}

/// What a finished run got through before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub attempted: usize,
    pub clicked: usize,
    pub confirmed: usize,
    pub timed_out: usize,
    pub total: usize,
}
