use std::fmt;
use std::sync::Arc;

use batch_core::{AppViewModel, ControlMode, ItemId, RunSummary, WorkItem};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("row {0} is no longer on the page")]
    RowMissing(ItemId),
    #[error("row {0} is not clickable")]
    NotClickable(ItemId),
}

/// The live list of rows in the host page.
pub trait ItemSource: Send + Sync {
    /// Current rows in page order.
    fn items(&self) -> Vec<WorkItem>;
    /// Trigger the row's save action. Completion is reported later on the event bus.
    fn click(&self, id: &ItemId) -> Result<(), HostError>;
}

/// Handler invoked with the detail of every event on a subscribed channel.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

/// Named broadcast channels exposed by the host environment.
pub trait EventBus: Send + Sync {
    fn subscribe(&self, channel: &str, handler: EventHandler) -> SubscriptionId;
    fn unsubscribe(&self, channel: &str, id: SubscriptionId);
}

pub trait ProgressSink: Send + Sync {
    /// `percent` is in `[0, 100]`.
    fn set_progress(&self, percent: f64);
}

/// The operator-facing start/stop toggle.
pub trait ControlSurface: Send + Sync {
    /// Gate before a run starts; `false` cancels the start.
    ///
    /// Runs on the blocking pool, so it may wait on the operator.
    fn confirm(&self, prompt: &str) -> bool;
    fn set_mode(&self, mode: ControlMode, label: &str);
    fn set_visible(&self, visible: bool);
    fn run_ended(&self, _summary: RunSummary) {}
    /// Called after any command that changed the controller's state.
    fn render(&self, _view: &AppViewModel) {}
}

/// Collaborators the runner executes effects against.
#[derive(Clone)]
pub struct Host {
    pub items: Arc<dyn ItemSource>,
    pub bus: Arc<dyn EventBus>,
    pub progress: Arc<dyn ProgressSink>,
    pub control: Arc<dyn ControlSurface>,
}
