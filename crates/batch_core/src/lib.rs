//! Batch save core: pure run controller state machine and view-model helpers.
mod effect;
mod item;
mod msg;
mod payload;
mod queue;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::{ControlMode, Effect, RunSummary, StopReason, TimerId, TimerPurpose};
pub use item::{ItemId, WorkItem};
pub use msg::Msg;
pub use payload::Confirmation;
pub use queue::QueueStrategy;
pub use settings::{
    Settings, DEFAULT_CHANNEL, DEFAULT_CONFIRM_PROMPT, DEFAULT_FALLBACK_TIMEOUT,
    DEFAULT_START_LABEL, DEFAULT_STEP_DELAY, DEFAULT_STOP_LABEL,
};
pub use state::{AppState, Phase, Progress, RunState};
pub use update::update;
pub use view_model::AppViewModel;
