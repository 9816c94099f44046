use batch_logging::{batch_debug, batch_info, batch_trace, batch_warn};

use crate::queue::Next;
use crate::{
    AppState, Confirmation, ControlMode, Effect, Msg, StopReason, TimerId, TimerPurpose, WorkItem,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every deferred call the controller schedules goes through one timer slot
/// in `state`; arming a timer always cancels the one it displaces, and a
/// firing whose id is no longer in the slot is discarded. That keeps at most
/// one step pending and at most one row awaiting confirmation.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::ControlClicked => {
            if state.is_running() {
                stop(&mut state, StopReason::Operator, &mut effects);
            } else if state.prompt_open() {
                batch_debug!("Start prompt already open, ignoring click");
            } else {
                state.set_prompt_open(true);
                effects.push(Effect::RequestStartConfirmation {
                    prompt: state.settings().confirm_prompt.clone(),
                });
            }
        }
        Msg::StartConfirmed { items } => {
            state.set_prompt_open(false);
            start(&mut state, &items, &mut effects);
        }
        Msg::StartDeclined => {
            state.set_prompt_open(false);
            batch_debug!("Batch save declined by operator");
        }
        Msg::StopClicked => stop(&mut state, StopReason::Operator, &mut effects),
        Msg::ConfirmationReceived(confirmation) => {
            on_confirmation(&mut state, &confirmation, &mut effects);
        }
        Msg::TimerFired { timer, items } => on_timer(&mut state, timer, &items, &mut effects),
        Msg::ItemsChanged { items } => {
            if let Some(visible) = state.refresh_control_visibility(&items) {
                effects.push(Effect::SetControlVisible(visible));
            }
        }
    }

    (state, effects)
}

fn start(state: &mut AppState, items: &[WorkItem], effects: &mut Vec<Effect>) {
    if state.is_running() {
        batch_warn!("Start ignored: a batch run is already in progress");
        return;
    }

    state.begin_run(items);
    let total = state.progress().total;
    batch_info!("Starting batch save for {} rows", total);

    effects.push(Effect::SetControl {
        mode: ControlMode::Stop,
        label: state.settings().stop_label.clone(),
    });
    if let Some(visible) = state.refresh_control_visibility(items) {
        effects.push(Effect::SetControlVisible(visible));
    }
    effects.push(Effect::Subscribe {
        channel: state.settings().channel.clone(),
    });
    effects.push(Effect::PublishProgress(state.progress()));
    step(state, items, effects);
}

/// Advance to the next row: click it and wait, or skip it if disabled.
fn step(state: &mut AppState, items: &[WorkItem], effects: &mut Vec<Effect>) {
    if let Some(previous) = state.take_timer() {
        effects.push(Effect::CancelTimer { timer: previous.id });
    }

    let selection = match state.take_next(items) {
        Next::Row(selection) => selection,
        Next::Deferred => {
            batch_debug!("Only requeued rows remain, looking again after the step delay");
            state.await_step();
            arm(state, TimerPurpose::Retry, effects);
            return;
        }
        Next::Exhausted => {
            batch_info!("No more rows to save, stopping");
            stop(state, StopReason::Completed, effects);
            return;
        }
    };

    let progress = state.progress();
    effects.push(Effect::PublishProgress(progress));
    batch_info!(
        "Saving row {}/{}, id={}",
        progress.processed,
        progress.total,
        selection.id
    );

    if selection.actionable {
        state.await_confirmation(selection.id.clone());
        effects.push(Effect::Click { item: selection.id });
        arm(state, TimerPurpose::Fallback, effects);
    } else {
        batch_info!("Row {} is disabled, skipping", selection.id);
        state.await_step();
        arm(state, TimerPurpose::Retry, effects);
    }
}

fn on_confirmation(state: &mut AppState, confirmation: &Confirmation, effects: &mut Vec<Effect>) {
    if !state.is_running() {
        batch_trace!("Ignoring confirmation while no run is active");
        return;
    }
    if *confirmation == Confirmation::Unrecognized {
        batch_trace!("Ignoring response without a recognized update shape");
        return;
    }

    let matched = state
        .pending()
        .and_then(|pending| confirmation.matched_id(pending))
        .cloned();
    let Some(id) = matched else {
        batch_debug!(
            "Ignoring {:?}, pending row is {:?}",
            confirmation,
            state.pending()
        );
        return;
    };

    batch_info!("Save confirmed for row {}, proceeding to next", id);
    state.record_confirmed();
    arm(state, TimerPurpose::Advance, effects);
}

fn on_timer(state: &mut AppState, timer: TimerId, items: &[WorkItem], effects: &mut Vec<Effect>) {
    if !state.is_running() {
        batch_trace!("Ignoring {} after the run ended", timer);
        return;
    }
    let Some(armed) = state.take_timer_if(timer) else {
        batch_debug!("Ignoring stale {}", timer);
        return;
    };

    if armed.purpose == TimerPurpose::Fallback {
        batch_warn!(
            "No confirmation for row {} within {:?}, proceeding to next",
            state.pending().map(ToString::to_string).unwrap_or_default(),
            state.settings().fallback_timeout
        );
        state.record_timeout();
    }
    step(state, items, effects);
}

fn stop(state: &mut AppState, reason: StopReason, effects: &mut Vec<Effect>) {
    if !state.is_running() {
        batch_debug!("Stop ignored: no batch run in progress");
        return;
    }

    if let Some(armed) = state.take_timer() {
        effects.push(Effect::CancelTimer { timer: armed.id });
    }
    let summary = state.end_run(reason);

    effects.push(Effect::Unsubscribe {
        channel: state.settings().channel.clone(),
    });
    effects.push(Effect::PublishProgress(state.progress()));
    effects.push(Effect::SetControl {
        mode: ControlMode::Start,
        label: state.settings().start_label.clone(),
    });
    effects.push(Effect::RunEnded(summary));
    batch_info!(
        "Batch save {}: {}/{} rows attempted, {} confirmed, {} timed out",
        reason,
        summary.attempted,
        summary.total,
        summary.confirmed,
        summary.timed_out
    );
}

fn arm(state: &mut AppState, purpose: TimerPurpose, effects: &mut Vec<Effect>) {
    let delay = match purpose {
        TimerPurpose::Fallback => state.settings().fallback_timeout,
        TimerPurpose::Retry | TimerPurpose::Advance => state.settings().step_delay,
    };
    let (timer, displaced) = state.arm_timer(purpose);
    if let Some(displaced) = displaced {
        effects.push(Effect::CancelTimer { timer: displaced });
    }
    effects.push(Effect::ArmTimer {
        timer,
        purpose,
        delay,
    });
}
