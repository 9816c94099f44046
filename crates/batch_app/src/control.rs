use std::io::{self, BufRead, Write};

use batch_core::{AppViewModel, ControlMode, RunSummary};
use batch_host::ControlSurface;
use batch_logging::{batch_debug, batch_info, batch_warn};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Declined,
    Finished(RunSummary),
}

/// Terminal stand-in for the page's toggle button and `confirm()` dialog.
///
/// The runner asks from the blocking pool, so reading stdin here never
/// stalls the runtime or the Ctrl-C handler.
pub(crate) struct TerminalControl {
    assume_yes: bool,
    outcome_tx: UnboundedSender<Outcome>,
}

impl TerminalControl {
    pub fn new(assume_yes: bool, outcome_tx: UnboundedSender<Outcome>) -> Self {
        Self {
            assume_yes,
            outcome_tx,
        }
    }

    fn ask(prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{prompt} [y/N] ")?;
        stdout.flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}

impl ControlSurface for TerminalControl {
    fn confirm(&self, prompt: &str) -> bool {
        let accepted = self.assume_yes
            || Self::ask(prompt).unwrap_or_else(|err| {
                batch_warn!("Could not read confirmation: {}", err);
                false
            });
        if !accepted {
            let _ = self.outcome_tx.send(Outcome::Declined);
        }
        accepted
    }

    fn set_mode(&self, mode: ControlMode, label: &str) {
        batch_info!("Control shows {:?} ({})", label, mode.style_class());
    }

    fn set_visible(&self, visible: bool) {
        batch_info!("Control {}", if visible { "shown" } else { "hidden" });
    }

    fn run_ended(&self, summary: RunSummary) {
        let _ = self.outcome_tx.send(Outcome::Finished(summary));
    }

    fn render(&self, view: &AppViewModel) {
        match &view.pending {
            Some(id) => batch_debug!(
                "{:?} {}/{}, waiting on row {}",
                view.phase,
                view.progress.processed,
                view.progress.total,
                id
            ),
            None => batch_debug!(
                "{:?} {}/{}",
                view.phase,
                view.progress.processed,
                view.progress.total
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_core::StopReason;
    use tokio::sync::mpsc;

    #[test]
    fn assume_yes_accepts_without_reading_stdin() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let control = TerminalControl::new(true, tx);

        assert!(control.confirm("Save everything?"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn finished_runs_are_reported_as_outcomes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let control = TerminalControl::new(true, tx);
        let summary = RunSummary {
            reason: StopReason::Completed,
            attempted: 2,
            clicked: 2,
            confirmed: 1,
            timed_out: 1,
            total: 2,
        };

        control.run_ended(summary);
        assert_eq!(rx.try_recv().ok(), Some(Outcome::Finished(summary)));
    }

    #[test]
    fn only_explicit_yes_answers_accept() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Yes \r\n"));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no\n"));
        assert!(!is_yes("yep\n"));
    }
}
