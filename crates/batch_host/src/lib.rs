//! Batch save host: effect execution against the host page, timers and config.
mod bus;
mod config;
mod host;
mod runner;
mod simulated;
mod timers;

pub use bus::BroadcastBus;
pub use config::{load_config, parse_config, BatchConfig, ConfigError};
pub use host::{
    ControlSurface, EventBus, EventHandler, Host, HostError, ItemSource, ProgressSink,
    SubscriptionId,
};
pub use runner::{BatchRunner, RunnerHandle};
pub use simulated::{RecordingProgress, ResponseMode, ScriptedControl, SimulatedPage};
