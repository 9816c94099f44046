use std::sync::Once;
use std::time::Duration;

use batch_core::{
    update, AppState, Confirmation, ControlMode, Effect, ItemId, Msg, Phase, Progress, RunState,
    RunSummary, StopReason, TimerId, TimerPurpose, WorkItem, DEFAULT_CHANNEL,
    DEFAULT_CONFIRM_PROMPT, DEFAULT_FALLBACK_TIMEOUT, DEFAULT_START_LABEL, DEFAULT_STEP_DELAY,
    DEFAULT_STOP_LABEL,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(batch_logging::initialize_for_tests);
}

fn three_rows() -> Vec<WorkItem> {
    vec![
        WorkItem::ready("1"),
        WorkItem::ready("2"),
        WorkItem::ready("3"),
    ]
}

fn saved(id: &str) -> Msg {
    Msg::ConfirmationReceived(Confirmation::Single(ItemId::from(id)))
}

fn progress(processed: usize, total: usize) -> Effect {
    Effect::PublishProgress(Progress { processed, total })
}

fn armed(effects: &[Effect]) -> TimerId {
    effects
        .iter()
        .rev()
        .find_map(|effect| match effect {
            Effect::ArmTimer { timer, .. } => Some(*timer),
            _ => None,
        })
        .expect("arm timer effect")
}

fn start(items: Vec<WorkItem>) -> (AppState, Vec<Effect>) {
    update(AppState::new(), Msg::StartConfirmed { items })
}

#[test]
fn control_click_while_idle_asks_for_confirmation() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ControlClicked);

    assert_eq!(
        effects,
        vec![Effect::RequestStartConfirmation {
            prompt: DEFAULT_CONFIRM_PROMPT.to_string(),
        }]
    );
    assert_eq!(state.run_state(), RunState::Idle);

    let (state, effects) = update(state, Msg::StartDeclined);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn clicks_while_the_prompt_is_open_ask_only_once() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::ControlClicked);
    assert!(state.view().prompt_open);

    let (state, effects) = update(state, Msg::ControlClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::StartDeclined);
    assert!(!state.prompt_open());
    let (state, effects) = update(state, Msg::ControlClicked);
    assert_eq!(
        effects,
        vec![Effect::RequestStartConfirmation {
            prompt: DEFAULT_CONFIRM_PROMPT.to_string(),
        }]
    );

    let (state, _) = update(state, Msg::StartConfirmed { items: three_rows() });
    assert!(state.is_running());
    assert!(!state.view().prompt_open);
}

#[test]
fn three_rows_end_to_end() {
    init_logging();
    let items = three_rows();

    let (state, effects) = start(items.clone());
    assert_eq!(
        effects,
        vec![
            Effect::SetControl {
                mode: ControlMode::Stop,
                label: DEFAULT_STOP_LABEL.to_string(),
            },
            Effect::SetControlVisible(true),
            Effect::Subscribe {
                channel: DEFAULT_CHANNEL.to_string(),
            },
            progress(0, 3),
            progress(1, 3),
            Effect::Click {
                item: ItemId::from("1"),
            },
            Effect::ArmTimer {
                timer: TimerId(1),
                purpose: TimerPurpose::Fallback,
                delay: DEFAULT_FALLBACK_TIMEOUT,
            },
        ]
    );
    assert_eq!(state.phase(), Phase::PendingConfirmation);
    assert_eq!(state.pending(), Some(&ItemId::from("1")));
    assert_eq!(state.progress().percent().round(), 33.0);

    // Confirmation for row 1 schedules the next step after the short delay.
    let (state, effects) = update(state, saved("1"));
    assert_eq!(
        effects,
        vec![
            Effect::CancelTimer { timer: TimerId(1) },
            Effect::ArmTimer {
                timer: TimerId(2),
                purpose: TimerPurpose::Advance,
                delay: DEFAULT_STEP_DELAY,
            },
        ]
    );
    assert_eq!(state.pending(), None);

    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: TimerId(2),
            items: items.clone(),
        },
    );
    assert_eq!(
        effects,
        vec![
            progress(2, 3),
            Effect::Click {
                item: ItemId::from("2"),
            },
            Effect::ArmTimer {
                timer: TimerId(3),
                purpose: TimerPurpose::Fallback,
                delay: DEFAULT_FALLBACK_TIMEOUT,
            },
        ]
    );
    assert_eq!(state.progress().percent().round(), 67.0);

    // Row 2 never confirms; the fallback advances to row 3.
    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: TimerId(3),
            items: items.clone(),
        },
    );
    assert_eq!(
        effects,
        vec![
            progress(3, 3),
            Effect::Click {
                item: ItemId::from("3"),
            },
            Effect::ArmTimer {
                timer: TimerId(4),
                purpose: TimerPurpose::Fallback,
                delay: DEFAULT_FALLBACK_TIMEOUT,
            },
        ]
    );
    assert_eq!(state.progress().percent(), 100.0);

    let (state, effects) = update(state, saved("3"));
    let advance = armed(&effects);
    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: advance,
            items,
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::Unsubscribe {
                channel: DEFAULT_CHANNEL.to_string(),
            },
            progress(0, 3),
            Effect::SetControl {
                mode: ControlMode::Start,
                label: DEFAULT_START_LABEL.to_string(),
            },
            Effect::RunEnded(RunSummary {
                reason: StopReason::Completed,
                attempted: 3,
                clicked: 3,
                confirmed: 2,
                timed_out: 1,
                total: 3,
            }),
        ]
    );
    assert_eq!(state.phase(), Phase::Stopped);
    assert_eq!(state.progress().percent(), 0.0);
    assert_eq!(state.view().control_label, DEFAULT_START_LABEL);
}

#[test]
fn control_click_while_running_stops() {
    init_logging();
    let (state, _) = start(three_rows());
    assert_eq!(state.view().control_label, DEFAULT_STOP_LABEL);

    let (state, effects) = update(state, Msg::ControlClicked);
    assert_eq!(
        effects,
        vec![
            Effect::CancelTimer { timer: TimerId(1) },
            Effect::Unsubscribe {
                channel: DEFAULT_CHANNEL.to_string(),
            },
            progress(0, 3),
            Effect::SetControl {
                mode: ControlMode::Start,
                label: DEFAULT_START_LABEL.to_string(),
            },
            Effect::RunEnded(RunSummary {
                reason: StopReason::Operator,
                attempted: 1,
                clicked: 1,
                confirmed: 0,
                timed_out: 0,
                total: 3,
            }),
        ]
    );
    assert_eq!(state.run_state(), RunState::Idle);
    assert_eq!(state.pending(), None);
}

#[test]
fn stop_is_idempotent() {
    init_logging();
    let (state, _) = start(three_rows());
    let (once, _) = update(state, Msg::StopClicked);
    let (twice, effects) = update(once.clone(), Msg::StopClicked);

    assert!(effects.is_empty());
    assert_eq!(once, twice);
}

#[test]
fn double_start_is_a_noop() {
    init_logging();
    let (state, _) = start(three_rows());
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::StartConfirmed {
            items: vec![WorkItem::ready("9")],
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn late_events_after_stop_are_ignored() {
    init_logging();
    let items = three_rows();
    let (state, effects) = start(items.clone());
    let fallback = armed(&effects);
    let (state, _) = update(state, Msg::StopClicked);
    let stopped = state.clone();

    let (state, effects) = update(state, saved("1"));
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: fallback,
            items,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, stopped);
}

#[test]
fn restart_after_stop_begins_a_fresh_run() {
    init_logging();
    let items = three_rows();
    let (state, _) = start(items.clone());
    let (state, _) = update(state, Msg::StopClicked);

    let (state, effects) = update(state, Msg::StartConfirmed { items });
    assert!(effects.contains(&Effect::Click {
        item: ItemId::from("1"),
    }));
    assert_eq!(state.progress(), Progress { processed: 1, total: 3 });
    // Timer ids keep counting so the first run's handles stay stale.
    assert_eq!(armed(&effects), TimerId(2));
}

#[test]
fn empty_page_completes_immediately() {
    init_logging();
    let (state, effects) = start(vec![WorkItem::hidden("1")]);

    assert!(effects.contains(&Effect::RunEnded(RunSummary {
        reason: StopReason::Completed,
        attempted: 0,
        clicked: 0,
        confirmed: 0,
        timed_out: 0,
        total: 0,
    })));
    assert!(!state.is_running());
}

#[test]
fn progress_never_decreases_during_a_run() {
    init_logging();
    let items: Vec<WorkItem> = (1..=6)
        .map(|n| {
            if n % 3 == 0 {
                WorkItem::disabled(n.to_string())
            } else {
                WorkItem::ready(n.to_string())
            }
        })
        .collect();

    let (mut state, mut effects) = start(items.clone());
    let mut last = 0;
    while state.is_running() {
        assert!(state.progress().processed >= last);
        assert!(state.pending().iter().count() <= 1);
        last = state.progress().processed;
        let timer = armed(&effects);
        (state, effects) = update(
            state,
            Msg::TimerFired {
                timer,
                items: items.clone(),
            },
        );
    }
    assert_eq!(last, 6);
    assert_eq!(state.progress().processed, 0);
}

#[test]
fn custom_settings_flow_into_effects() {
    init_logging();
    let settings = batch_core::Settings {
        step_delay: Duration::from_millis(50),
        fallback_timeout: Duration::from_secs(1),
        channel: "custom:channel".to_string(),
        ..batch_core::Settings::default()
    };
    let (_state, effects) = update(
        AppState::with_settings(settings),
        Msg::StartConfirmed {
            items: vec![WorkItem::ready("1")],
        },
    );

    assert!(effects.contains(&Effect::Subscribe {
        channel: "custom:channel".to_string(),
    }));
    assert!(effects.contains(&Effect::ArmTimer {
        timer: TimerId(1),
        purpose: TimerPurpose::Fallback,
        delay: Duration::from_secs(1),
    }));
}
