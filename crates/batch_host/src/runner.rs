use std::sync::Arc;

use batch_core::{update, AppState, Confirmation, Effect, Msg, Settings, TimerId};
use batch_logging::{batch_debug, batch_info, batch_warn};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::host::{Host, SubscriptionId};
use crate::timers::TimerTasks;

/// Everything that can wake the runner, from the operator, timers or the bus.
#[derive(Debug)]
pub(crate) enum Command {
    ControlClicked,
    PromptAnswered(bool),
    Stop,
    ItemsChanged,
    TimerFired(TimerId),
    Confirmation(Confirmation),
    Shutdown,
}

/// Operator-side handle to a [`BatchRunner`].
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    cmd_tx: UnboundedSender<Command>,
}

impl RunnerHandle {
    /// Press the start/stop toggle.
    pub fn control_clicked(&self) {
        let _ = self.cmd_tx.send(Command::ControlClicked);
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(Command::Stop);
    }

    /// Tell the runner the host page re-rendered its rows.
    pub fn items_changed(&self) {
        let _ = self.cmd_tx.send(Command::ItemsChanged);
    }

    /// Stop any run and end [`BatchRunner::run`].
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
    }
}

/// Drives the controller: one command at a time, effects executed in order.
pub struct BatchRunner {
    state: AppState,
    host: Host,
    cmd_tx: UnboundedSender<Command>,
    cmd_rx: UnboundedReceiver<Command>,
    timers: TimerTasks,
    subscription: Option<(String, SubscriptionId)>,
}

impl BatchRunner {
    pub fn new(settings: Settings, host: Host) -> (Self, RunnerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = RunnerHandle {
            cmd_tx: cmd_tx.clone(),
        };
        let runner = Self {
            state: AppState::with_settings(settings),
            host,
            cmd_tx,
            cmd_rx,
            timers: TimerTasks::default(),
            subscription: None,
        };
        (runner, handle)
    }

    /// Process commands until [`RunnerHandle::shutdown`] is called.
    pub async fn run(mut self) {
        while let Some(command) = self.cmd_rx.recv().await {
            let msg = match command {
                Command::Shutdown => break,
                Command::ControlClicked => Msg::ControlClicked,
                Command::PromptAnswered(true) => Msg::StartConfirmed {
                    items: self.host.items.items(),
                },
                Command::PromptAnswered(false) => Msg::StartDeclined,
                Command::Stop => Msg::StopClicked,
                Command::ItemsChanged => Msg::ItemsChanged {
                    items: self.host.items.items(),
                },
                Command::TimerFired(timer) => {
                    self.timers.fired(timer);
                    Msg::TimerFired {
                        timer,
                        items: self.host.items.items(),
                    }
                }
                Command::Confirmation(confirmation) => Msg::ConfirmationReceived(confirmation),
            };
            self.dispatch(msg);
        }

        self.dispatch(Msg::StopClicked);
        batch_debug!("Runner shut down with {} timers outstanding", self.timers.len());
        self.timers.cancel_all();
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.apply(effect);
        }

        if self.state.consume_dirty() {
            self.host.control.render(&self.state.view());
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::RequestStartConfirmation { prompt } => self.ask(prompt),
            Effect::SetControl { mode, label } => self.host.control.set_mode(mode, &label),
            Effect::SetControlVisible(visible) => self.host.control.set_visible(visible),
            Effect::Subscribe { channel } => self.subscribe(channel),
            Effect::Unsubscribe { channel } => self.unsubscribe(&channel),
            Effect::PublishProgress(progress) => {
                self.host.progress.set_progress(progress.percent());
            }
            Effect::Click { item } => {
                if let Err(err) = self.host.items.click(&item) {
                    // The fallback timer armed alongside this click moves the run on.
                    batch_warn!("Click on row {} failed: {}", item, err);
                }
            }
            Effect::ArmTimer { timer, delay, .. } => {
                self.timers.arm(timer, delay, self.cmd_tx.clone());
            }
            Effect::CancelTimer { timer } => self.timers.cancel(timer),
            Effect::RunEnded(summary) => self.host.control.run_ended(summary),
        }
    }

    /// Puts the prompt to the operator without holding up other commands.
    fn ask(&self, prompt: String) {
        let control = self.host.control.clone();
        let tx = self.cmd_tx.clone();
        tokio::task::spawn_blocking(move || {
            let accepted = control.confirm(&prompt);
            let _ = tx.send(Command::PromptAnswered(accepted));
        });
    }

    fn subscribe(&mut self, channel: String) {
        if self.subscription.is_some() {
            batch_warn!("Already subscribed, ignoring subscribe to {}", channel);
            return;
        }
        let tx = self.cmd_tx.clone();
        let handler = Arc::new(move |detail: &Value| {
            let _ = tx.send(Command::Confirmation(Confirmation::from_event(detail)));
        });
        let id = self.host.bus.subscribe(&channel, handler);
        batch_info!("Listening for save responses on {} ({})", channel, id);
        self.subscription = Some((channel, id));
    }

    fn unsubscribe(&mut self, channel: &str) {
        match self.subscription.take() {
            Some((subscribed, id)) => {
                self.host.bus.unsubscribe(&subscribed, id);
                batch_debug!("Stopped listening on {} ({})", subscribed, id);
            }
            None => batch_debug!("Not subscribed to {}, nothing to remove", channel),
        }
    }
}
