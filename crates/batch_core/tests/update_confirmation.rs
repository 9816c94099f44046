use std::sync::Once;

use batch_core::{
    update, AppState, Confirmation, Effect, ItemId, Msg, Phase, TimerId, TimerPurpose, WorkItem,
    DEFAULT_STEP_DELAY,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(batch_logging::initialize_for_tests);
}

/// Starts a run over rows "5" and "6", leaving "5" pending.
fn pending_on_five() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::StartConfirmed {
            items: vec![WorkItem::ready("5"), WorkItem::ready("6")],
        },
    );
    assert_eq!(state.pending(), Some(&ItemId::from("5")));
    state
}

fn receive(state: AppState, detail: serde_json::Value) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ConfirmationReceived(Confirmation::from_event(&detail)),
    )
}

fn schedules_advance(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| {
        matches!(
            effect,
            Effect::ArmTimer {
                purpose: TimerPurpose::Advance,
                delay,
                ..
            } if *delay == DEFAULT_STEP_DELAY
        )
    })
}

#[test]
fn single_update_for_pending_row_schedules_next_step() {
    init_logging();
    let (state, effects) = receive(
        pending_on_five(),
        json!({ "data": { "sceneUpdate": { "id": "5" } } }),
    );

    assert!(schedules_advance(&effects));
    assert_eq!(state.phase(), Phase::AwaitingClick);
    assert_eq!(state.pending(), None);
}

#[test]
fn batched_update_containing_pending_row_schedules_next_step() {
    init_logging();
    let (_, effects) = receive(
        pending_on_five(),
        json!({ "data": { "scenesUpdate": [{ "id": "1" }, { "id": "5" }] } }),
    );
    assert!(schedules_advance(&effects));
}

#[test]
fn alternate_bulk_shape_is_accepted() {
    init_logging();
    let (_, effects) = receive(
        pending_on_five(),
        json!({ "data": { "bulkSceneUpdate": { "id": 5 } } }),
    );
    assert!(schedules_advance(&effects));
}

#[test]
fn foreign_or_unknown_responses_change_nothing() {
    init_logging();
    let state = pending_on_five();
    let before = state.clone();

    let (state, effects) = receive(state, json!({ "data": { "sceneUpdate": { "id": "9" } } }));
    assert!(effects.is_empty());
    let (state, effects) = receive(state, json!({ "data": { "scenesUpdate": [{ "id": "1" }] } }));
    assert!(effects.is_empty());
    let (state, effects) = receive(state, json!({ "data": { "findScenes": { "count": 2 } } }));
    assert!(effects.is_empty());
    let (state, effects) = receive(state, json!("not an object"));
    assert!(effects.is_empty());

    assert_eq!(state, before);
}

#[test]
fn duplicate_confirmation_does_not_reschedule() {
    init_logging();
    let payload = json!({ "data": { "sceneUpdate": { "id": "5" } } });
    let (state, first) = receive(pending_on_five(), payload.clone());
    assert!(schedules_advance(&first));

    let (_, second) = receive(state, payload);
    assert!(second.is_empty());
}

#[test]
fn late_confirmation_after_timeout_is_not_misattributed() {
    init_logging();
    let items = vec![WorkItem::ready("5"), WorkItem::ready("6")];
    let state = pending_on_five();

    // Fallback for row 5 fires; row 6 is clicked.
    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: TimerId(1),
            items,
        },
    );
    assert!(effects.contains(&Effect::Click {
        item: ItemId::from("6"),
    }));
    assert_eq!(state.pending(), Some(&ItemId::from("6")));

    // Row 5's confirmation shows up late and must not advance past row 6.
    let before = state.clone();
    let (state, effects) = receive(state, json!({ "data": { "sceneUpdate": { "id": "5" } } }));
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn fallback_fires_once_and_stale_timers_are_ignored() {
    init_logging();
    let items = vec![WorkItem::ready("5"), WorkItem::ready("6")];
    let (state, effects) = receive(
        pending_on_five(),
        json!({ "data": { "sceneUpdate": { "id": "5" } } }),
    );
    assert!(effects.contains(&Effect::CancelTimer { timer: TimerId(1) }));

    // The cancelled fallback raced past its abort; it must not step.
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: TimerId(1),
            items: items.clone(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: TimerId(2),
            items: items.clone(),
        },
    );
    let clicks = effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Click { .. }))
        .count();
    assert_eq!(clicks, 1);

    // Firing the consumed advance timer again is a no-op.
    let (_, effects) = update(state, Msg::TimerFired { timer: TimerId(2), items });
    assert!(effects.is_empty());
}
