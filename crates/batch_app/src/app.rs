use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use batch_core::{Settings, WorkItem};
use batch_host::{
    load_config, BatchRunner, BroadcastBus, Host, ProgressSink, ResponseMode, SimulatedPage,
};
use batch_logging::{batch_info, batch_warn};
use chrono::Utc;
use tokio::sync::mpsc;

use crate::cli::Cli;
use crate::control::{Outcome, TerminalControl};

struct LoggedProgress;

impl ProgressSink for LoggedProgress {
    fn set_progress(&self, percent: f64) {
        batch_info!("Progress {:.0}%", percent);
    }
}

pub(crate) async fn run(args: Cli) -> Result<()> {
    let settings = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Settings::default(),
    };

    let bus = Arc::new(BroadcastBus::new());
    let page = Arc::new(SimulatedPage::new(
        bus.clone(),
        &settings.channel,
        Duration::from_millis(args.latency_ms),
    ));
    populate(&page, &args);

    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let host = Host {
        items: page.clone(),
        bus,
        progress: Arc::new(LoggedProgress),
        control: Arc::new(TerminalControl::new(args.yes, outcome_tx)),
    };
    let (runner, handle) = BatchRunner::new(settings, host);
    let task = tokio::spawn(runner.run());

    let started = Utc::now();
    handle.items_changed();
    handle.control_clicked();

    let (outcome, interrupted) = tokio::select! {
        outcome = outcome_rx.recv() => (outcome, false),
        _ = tokio::signal::ctrl_c() => {
            batch_warn!("Interrupted, stopping the batch");
            (None, true)
        }
    };
    // Shutting down stops an active run, which still reports its summary.
    handle.shutdown();
    task.await.context("runner task panicked")?;
    let outcome = outcome.or_else(|| outcome_rx.try_recv().ok());

    match outcome {
        Some(Outcome::Finished(summary)) => {
            let finished = Utc::now();
            println!(
                "Batch save {} at {}: {}/{} rows attempted, {} clicked, {} confirmed, {} timed out ({}s)",
                summary.reason,
                finished.to_rfc3339(),
                summary.attempted,
                summary.total,
                summary.clicked,
                summary.confirmed,
                summary.timed_out,
                (finished - started).num_seconds()
            );
            Ok(())
        }
        Some(Outcome::Declined) => {
            println!("Batch save cancelled.");
            Ok(())
        }
        None if interrupted => {
            println!("Batch save interrupted before it started.");
            Ok(())
        }
        None => bail!("runner stopped without reporting an outcome"),
    }
}

fn populate(page: &SimulatedPage, args: &Cli) {
    let every = |n: usize, step: usize| step > 0 && n % step == 0;
    for n in 1..=args.rows {
        let id = n.to_string();
        let item = if every(n, args.disabled_every) {
            WorkItem::disabled(id)
        } else {
            WorkItem::ready(id)
        };
        let response = if every(n, args.silent_every) {
            ResponseMode::Silent
        } else {
            match n % 3 {
                0 => ResponseMode::Batch,
                1 => ResponseMode::Single,
                _ => ResponseMode::Alternate,
            }
        };
        page.push(item, response);
    }
}
