//! In-process stand-ins for the host page, used by the demo binary and tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use batch_core::{AppViewModel, ControlMode, ItemId, RunSummary, WorkItem};
use batch_logging::batch_debug;
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{BroadcastBus, ControlSurface, HostError, ItemSource, ProgressSink};

/// How the simulated backend reports a save once a row is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `{ sceneUpdate: { id } }`
    Single,
    /// `{ scenesUpdate: [{ id: <other> }, { id }] }`
    Batch,
    /// `{ bulkSceneUpdate: { id } }`
    Alternate,
    /// Never responds.
    Silent,
}

impl ResponseMode {
    fn detail(self, id: &ItemId) -> Option<Value> {
        let id = id.as_str();
        let data = match self {
            ResponseMode::Single => json!({ "sceneUpdate": { "id": id } }),
            ResponseMode::Batch => json!({
                "scenesUpdate": [{ "id": format!("{id}-sibling") }, { "id": id }]
            }),
            ResponseMode::Alternate => json!({ "bulkSceneUpdate": { "id": id } }),
            ResponseMode::Silent => return None,
        };
        Some(json!({ "data": data }))
    }
}

#[derive(Debug, Clone)]
struct SimRow {
    item: WorkItem,
    response: ResponseMode,
}

/// A list of rows whose save action answers on a [`BroadcastBus`] after `latency`.
pub struct SimulatedPage {
    rows: Mutex<Vec<SimRow>>,
    clicks: Mutex<Vec<ItemId>>,
    bus: Arc<BroadcastBus>,
    channel: String,
    latency: Duration,
}

impl SimulatedPage {
    pub fn new(bus: Arc<BroadcastBus>, channel: impl Into<String>, latency: Duration) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clicks: Mutex::new(Vec::new()),
            bus,
            channel: channel.into(),
            latency,
        }
    }

    pub fn push(&self, item: WorkItem, response: ResponseMode) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SimRow { item, response });
    }

    /// Hide or reveal a row, like the operator removing it from the list.
    pub fn set_eligible(&self, id: &ItemId, eligible: bool) {
        self.edit(id, |item| item.eligible = eligible);
    }

    pub fn set_actionable(&self, id: &ItemId, actionable: bool) {
        self.edit(id, |item| item.actionable = actionable);
    }

    /// Rows clicked so far, in click order.
    pub fn clicks(&self) -> Vec<ItemId> {
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn edit(&self, id: &ItemId, change: impl FnOnce(&mut WorkItem)) {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.item.id.as_ref() == Some(id))
        {
            change(&mut row.item);
        }
    }
}

impl ItemSource for SimulatedPage {
    fn items(&self) -> Vec<WorkItem> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|row| row.item.clone())
            .collect()
    }

    /// Must be called from within a tokio runtime; the response is published
    /// from a spawned task.
    fn click(&self, id: &ItemId) -> Result<(), HostError> {
        let response = {
            let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
            let row = rows
                .iter()
                .find(|row| row.item.eligible_id() == Some(id))
                .ok_or_else(|| HostError::RowMissing(id.clone()))?;
            if !row.item.actionable {
                return Err(HostError::NotClickable(id.clone()));
            }
            row.response
        };
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id.clone());

        let Some(detail) = response.detail(id) else {
            batch_debug!("Row {} will never answer", id);
            return Ok(());
        };
        let bus = self.bus.clone();
        let channel = self.channel.clone();
        let latency = self.latency;
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            bus.publish(&channel, &detail);
        });
        Ok(())
    }
}

/// Progress sink that keeps every published percentage.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    values: Mutex<Vec<f64>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn set_progress(&self, percent: f64) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(percent);
    }
}

#[derive(Debug, Clone)]
struct ControlView {
    mode: ControlMode,
    label: String,
    visible: bool,
}

/// Operator control that answers the start prompt with a fixed decision and
/// reports finished runs on a channel.
pub struct ScriptedControl {
    accept: bool,
    view: Mutex<ControlView>,
    rendered: Mutex<Option<AppViewModel>>,
    ended_tx: UnboundedSender<RunSummary>,
}

impl ScriptedControl {
    pub fn new(accept: bool, start_label: &str) -> (Self, UnboundedReceiver<RunSummary>) {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        let control = Self {
            accept,
            view: Mutex::new(ControlView {
                mode: ControlMode::Start,
                label: start_label.to_string(),
                visible: false,
            }),
            rendered: Mutex::new(None),
            ended_tx,
        };
        (control, ended_rx)
    }

    pub fn mode(&self) -> ControlMode {
        self.view.lock().unwrap_or_else(PoisonError::into_inner).mode
    }

    pub fn label(&self) -> String {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .label
            .clone()
    }

    pub fn visible(&self) -> bool {
        self.view.lock().unwrap_or_else(PoisonError::into_inner).visible
    }

    /// The most recent controller snapshot the runner rendered.
    pub fn last_rendered(&self) -> Option<AppViewModel> {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ControlSurface for ScriptedControl {
    fn confirm(&self, prompt: &str) -> bool {
        batch_debug!("Prompt {:?} answered {}", prompt, self.accept);
        self.accept
    }

    fn set_mode(&self, mode: ControlMode, label: &str) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.mode = mode;
        view.label = label.to_string();
    }

    fn set_visible(&self, visible: bool) {
        self.view.lock().unwrap_or_else(PoisonError::into_inner).visible = visible;
    }

    fn run_ended(&self, summary: RunSummary) {
        let _ = self.ended_tx.send(summary);
    }

    fn render(&self, view: &AppViewModel) {
        *self.rendered.lock().unwrap_or_else(PoisonError::into_inner) = Some(view.clone());
    }
}
