use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use batch_core::{
    QueueStrategy, Settings, DEFAULT_CHANNEL, DEFAULT_CONFIRM_PROMPT, DEFAULT_FALLBACK_TIMEOUT,
    DEFAULT_START_LABEL, DEFAULT_STEP_DELAY, DEFAULT_STOP_LABEL,
};
use batch_logging::batch_info;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// On-disk controller configuration (RON). Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub step_delay_ms: u64,
    pub fallback_timeout_ms: u64,
    pub strategy: QueueStrategy,
    pub channel: String,
    pub confirm_prompt: String,
    pub start_label: String,
    pub stop_label: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: millis(DEFAULT_STEP_DELAY),
            fallback_timeout_ms: millis(DEFAULT_FALLBACK_TIMEOUT),
            strategy: QueueStrategy::default(),
            channel: DEFAULT_CHANNEL.to_string(),
            confirm_prompt: DEFAULT_CONFIRM_PROMPT.to_string(),
            start_label: DEFAULT_START_LABEL.to_string(),
            stop_label: DEFAULT_STOP_LABEL.to_string(),
        }
    }
}

impl BatchConfig {
    /// Validate and convert into controller settings.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        if self.fallback_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "fallback_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.step_delay_ms >= self.fallback_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "step_delay_ms ({}) must be shorter than fallback_timeout_ms ({})",
                self.step_delay_ms, self.fallback_timeout_ms
            )));
        }
        if self.channel.trim().is_empty() {
            return Err(ConfigError::Invalid("channel must not be empty".into()));
        }

        Ok(Settings {
            step_delay: Duration::from_millis(self.step_delay_ms),
            fallback_timeout: Duration::from_millis(self.fallback_timeout_ms),
            strategy: self.strategy,
            channel: self.channel,
            confirm_prompt: self.confirm_prompt,
            start_label: self.start_label,
            stop_label: self.stop_label,
        })
    }
}

pub fn parse_config(text: &str) -> Result<BatchConfig, ConfigError> {
    Ok(ron::from_str(text)?)
}

/// Load and validate settings from a RON file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse_config(&text)?.into_settings()?;
    batch_info!("Loaded config from {:?}", path);
    Ok(settings)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
