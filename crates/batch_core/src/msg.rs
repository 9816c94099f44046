use crate::{Confirmation, TimerId, WorkItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator pressed the start/stop toggle.
    ControlClicked,
    /// Operator accepted the start prompt; `items` is the live row snapshot.
    StartConfirmed { items: Vec<WorkItem> },
    /// Operator dismissed the start prompt.
    StartDeclined,
    /// Operator requested a stop regardless of the toggle state.
    StopClicked,
    /// A save-completion notification arrived on the subscribed channel.
    ConfirmationReceived(Confirmation),
    /// A deferred call came due; `items` is the live row snapshot at firing time.
    TimerFired {
        timer: TimerId,
        items: Vec<WorkItem>,
    },
    /// The host page re-rendered its rows.
    ItemsChanged { items: Vec<WorkItem> },
}
