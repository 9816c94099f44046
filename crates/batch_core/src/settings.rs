use std::time::Duration;

use crate::QueueStrategy;

/// Delay before re-running a step after a disabled row or a matched confirmation.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(200);
/// How long to wait for a confirmation before advancing anyway.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(5000);
/// Broadcast channel carrying mutation responses.
pub const DEFAULT_CHANNEL: &str = "stash:response";
pub const DEFAULT_CONFIRM_PROMPT: &str = "Are you sure you want to batch save?";
pub const DEFAULT_START_LABEL: &str = "Save All";
pub const DEFAULT_STOP_LABEL: &str = "Stop Save";

/// Controller tuning, fixed for the lifetime of an [`AppState`](crate::AppState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub step_delay: Duration,
    pub fallback_timeout: Duration,
    pub strategy: QueueStrategy,
    pub channel: String,
    pub confirm_prompt: String,
    pub start_label: String,
    pub stop_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            strategy: QueueStrategy::default(),
            channel: DEFAULT_CHANNEL.to_string(),
            confirm_prompt: DEFAULT_CONFIRM_PROMPT.to_string(),
            start_label: DEFAULT_START_LABEL.to_string(),
            stop_label: DEFAULT_STOP_LABEL.to_string(),
        }
    }
}
