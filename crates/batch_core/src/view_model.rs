use crate::{ItemId, Phase, Progress, RunState};

/// Snapshot of the controller for whatever renders its status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub run_state: RunState,
    pub phase: Phase,
    pub progress: Progress,
    pub pending: Option<ItemId>,
    pub control_label: String,
    pub control_visible: bool,
    pub prompt_open: bool,
}
