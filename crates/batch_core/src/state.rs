use crate::effect::{RunSummary, StopReason, TimerId, TimerPurpose};
use crate::item::count_eligible;
use crate::queue::{Next, WorkQueue};
use crate::view_model::AppViewModel;
use crate::{ItemId, Settings, WorkItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No run has happened yet.
    #[default]
    Idle,
    /// Running; the next step is scheduled.
    AwaitingClick,
    /// Running; a click was issued and its confirmation is outstanding.
    PendingConfirmation,
    /// A run ended; a new one may be started.
    Stopped,
}

impl Phase {
    pub fn run_state(self) -> RunState {
        match self {
            Phase::AwaitingClick | Phase::PendingConfirmation => RunState::Running,
            Phase::Idle | Phase::Stopped => RunState::Idle,
        }
    }
}

/// Attempts made so far out of the rows eligible when the run started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion percentage in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let ratio = self.processed as f64 / self.total as f64;
        (ratio * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArmedTimer {
    pub id: TimerId,
    pub purpose: TimerPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RunStats {
    clicked: usize,
    confirmed: usize,
    timed_out: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: Settings,
    phase: Phase,
    queue: WorkQueue,
    pending: Option<ItemId>,
    progress: Progress,
    stats: RunStats,
    timer: Option<ArmedTimer>,
    next_timer: u64,
    control_visible: bool,
    prompt_open: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_state(&self) -> RunState {
        self.phase.run_state()
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// Id of the row whose confirmation is outstanding.
    pub fn pending(&self) -> Option<&ItemId> {
        self.pending.as_ref()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            run_state: self.run_state(),
            phase: self.phase,
            progress: self.progress,
            pending: self.pending.clone(),
            control_label: self.control_label().to_string(),
            control_visible: self.control_visible,
            prompt_open: self.prompt_open,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn control_label(&self) -> &str {
        if self.is_running() {
            &self.settings.stop_label
        } else {
            &self.settings.start_label
        }
    }

    /// Whether a start prompt has been requested and not yet answered.
    pub fn prompt_open(&self) -> bool {
        self.prompt_open
    }

    pub(crate) fn set_prompt_open(&mut self, open: bool) {
        if self.prompt_open != open {
            self.prompt_open = open;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_run(&mut self, items: &[WorkItem]) {
        self.phase = Phase::AwaitingClick;
        self.queue = WorkQueue::build(self.settings.strategy, items);
        self.pending = None;
        self.progress = Progress {
            processed: 0,
            total: count_eligible(items),
        };
        self.stats = RunStats::default();
        self.dirty = true;
    }

    /// Picks the next row and counts the attempt. Deferred and exhausted
    /// queues leave the counter alone.
    pub(crate) fn take_next(&mut self, items: &[WorkItem]) -> Next {
        let next = self.queue.next(items);
        if let Next::Row(_) = next {
            self.progress.processed += 1;
            self.dirty = true;
        }
        next
    }

    pub(crate) fn await_confirmation(&mut self, id: ItemId) {
        self.pending = Some(id);
        self.stats.clicked += 1;
        self.phase = Phase::PendingConfirmation;
        self.dirty = true;
    }

    pub(crate) fn await_step(&mut self) {
        self.pending = None;
        self.phase = Phase::AwaitingClick;
        self.dirty = true;
    }

    pub(crate) fn record_confirmed(&mut self) {
        self.stats.confirmed += 1;
        self.await_step();
    }

    pub(crate) fn record_timeout(&mut self) {
        self.stats.timed_out += 1;
        self.await_step();
    }

    /// Allocates a fresh timer into the single slot, returning the one it displaced.
    pub(crate) fn arm_timer(&mut self, purpose: TimerPurpose) -> (TimerId, Option<TimerId>) {
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        let displaced = self.timer.replace(ArmedTimer { id, purpose });
        (id, displaced.map(|armed| armed.id))
    }

    pub(crate) fn take_timer(&mut self) -> Option<ArmedTimer> {
        self.timer.take()
    }

    /// Clears the slot if `id` is the armed timer.
    pub(crate) fn take_timer_if(&mut self, id: TimerId) -> Option<ArmedTimer> {
        if self.timer.map(|armed| armed.id) == Some(id) {
            self.timer.take()
        } else {
            None
        }
    }

    pub(crate) fn end_run(&mut self, reason: StopReason) -> RunSummary {
        let summary = RunSummary {
            reason,
            attempted: self.progress.processed,
            clicked: self.stats.clicked,
            confirmed: self.stats.confirmed,
            timed_out: self.stats.timed_out,
            total: self.progress.total,
        };
        self.phase = Phase::Stopped;
        self.queue = WorkQueue::Empty;
        self.pending = None;
        self.progress.processed = 0;
        self.dirty = true;
        summary
    }

    /// Updates visibility, returning the new value if it changed.
    pub(crate) fn refresh_control_visibility(&mut self, items: &[WorkItem]) -> Option<bool> {
        let visible = self.is_running() || count_eligible(items) > 0;
        if visible == self.control_visible {
            return None;
        }
        self.control_visible = visible;
        self.dirty = true;
        Some(visible)
    }
}
