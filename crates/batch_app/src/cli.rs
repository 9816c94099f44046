use std::path::PathBuf;

use batch_logging::LogDestination;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Batch-save every row of a simulated tagger page, one row at a time.
#[derive(Debug, Parser)]
#[command(name = "batch-save", version, about)]
pub(crate) struct Cli {
    /// RON config file; defaults are used when omitted.
    #[arg(long, env = "BATCH_SAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of rows on the simulated page.
    #[arg(long, default_value_t = 8)]
    pub rows: usize,

    /// Every Nth row has a disabled save button (0 = none).
    #[arg(long, default_value_t = 5)]
    pub disabled_every: usize,

    /// Every Nth row never confirms its save (0 = none).
    #[arg(long, default_value_t = 4)]
    pub silent_every: usize,

    /// Simulated save round-trip in milliseconds.
    #[arg(long, default_value_t = 150)]
    pub latency_ms: u64,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
