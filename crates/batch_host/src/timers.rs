use std::collections::HashMap;
use std::time::Duration;

use batch_core::TimerId;
use batch_logging::batch_trace;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::runner::Command;

/// Deferred calls backed by sleeping tokio tasks.
///
/// Aborting a task is best effort: a firing may already be queued, which is
/// why the controller also checks the timer id against its slot.
#[derive(Default)]
pub(crate) struct TimerTasks {
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TimerTasks {
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, timer: TimerId, delay: Duration, tx: UnboundedSender<Command>) {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::TimerFired(timer));
        });
        if let Some(previous) = self.tasks.insert(timer, handle) {
            previous.abort();
        }
        batch_trace!("Armed {} for {:?}", timer, delay);
    }

    pub fn cancel(&mut self, timer: TimerId) {
        if let Some(handle) = self.tasks.remove(&timer) {
            handle.abort();
            batch_trace!("Cancelled {}", timer);
        }
    }

    /// Forget a timer whose task already completed.
    pub fn fired(&mut self, timer: TimerId) {
        self.tasks.remove(&timer);
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}
