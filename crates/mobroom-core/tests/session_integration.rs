//! Integration tests for the session store.
//!
//! Drives the store through its public action set with a manual timer and
//! checks the rotation, break and roster invariants end to end.

use mobroom_core::timer::MINUTE_MS;
use mobroom_core::{
    Action, CoreError, Event, ManualTimer, PhaseState, SessionConfig, SessionStore,
    ValidationError,
};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn new_store(timer_min: u64, break_min: u64, rotations_per_break: u32) -> SessionStore<ManualTimer> {
    let config = SessionConfig::from_minutes(timer_min, break_min, rotations_per_break).unwrap();
    SessionStore::new(config, ManualTimer::new()).with_tick_ms(0)
}

fn add_all(store: &mut SessionStore<ManualTimer>, names: &[&str]) {
    for name in names {
        store
            .dispatch(Action::AddMember {
                name: (*name).to_string(),
            })
            .unwrap();
    }
}

fn id_of(store: &SessionStore<ManualTimer>, name: &str) -> String {
    store.roster().find_by_name(name).unwrap().id.clone()
}

/// Fire the armed timer once.
fn expire(store: &mut SessionStore<ManualTimer>) -> Option<Event> {
    let token = store.timer_mut().take_pending()?;
    store.on_timer(token)
}

fn roles(store: &SessionStore<ManualTimer>) -> (String, String) {
    let roles = store.snapshot().roles.expect("turn has roles");
    (roles.driver.name, roles.navigator.name)
}

fn pair(driver: &str, navigator: &str) -> (String, String) {
    (driver.to_string(), navigator.to_string())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_three_members_two_rotations_per_break() {
    let mut store = new_store(1, 1, 2);
    add_all(&mut store, &["A", "B", "C"]);

    store.dispatch(Action::StartSession).unwrap();
    let snap = store.snapshot();
    assert_eq!(
        snap.phase,
        PhaseState::Turn {
            rotation_index: 0,
            remaining_ms: 60_000
        }
    );
    assert_eq!(roles(&store), pair("A", "B"));

    expire(&mut store);
    let snap = store.snapshot();
    assert!(matches!(snap.phase, PhaseState::Turn { rotation_index: 1, .. }));
    assert_eq!(snap.rotation_counter, 1);
    assert_eq!(roles(&store), pair("B", "C"));

    expire(&mut store);
    let snap = store.snapshot();
    assert!(matches!(snap.phase, PhaseState::Break { .. }));
    assert_eq!(snap.rotation_counter, 0);

    expire(&mut store);
    let snap = store.snapshot();
    assert!(matches!(snap.phase, PhaseState::Turn { rotation_index: 2, .. }));
    assert_eq!(roles(&store), pair("C", "A"));
}

#[test]
fn test_single_member_drives_and_navigates() {
    let mut store = new_store(1, 1, 2);
    add_all(&mut store, &["A"]);
    store.dispatch(Action::StartSession).unwrap();
    assert_eq!(roles(&store), pair("A", "A"));

    expire(&mut store);
    assert_eq!(roles(&store), pair("A", "A"));
}

#[test]
fn test_blank_member_name_rejected() {
    let mut store = new_store(1, 1, 2);
    add_all(&mut store, &["A"]);
    let before = store.snapshot();

    let err = store
        .dispatch(Action::AddMember { name: String::new() })
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::EmptyName)
    ));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_break_after_rotations_per_break_expiries() {
    for rotations in 1..=5u32 {
        let mut store = new_store(1, 2, rotations);
        add_all(&mut store, &["A", "B"]);
        store.dispatch(Action::StartSession).unwrap();
        for _ in 0..rotations {
            expire(&mut store);
        }
        let snap = store.snapshot();
        assert!(
            matches!(snap.phase, PhaseState::Break { remaining_ms } if remaining_ms == 2 * MINUTE_MS),
            "rotations_per_break={rotations}: {:?}",
            snap.phase
        );
        assert_eq!(snap.rotation_counter, 0);
    }
}

#[test]
fn test_timer_adjustment_mid_turn_is_deferred() {
    let config = SessionConfig::from_minutes(2, 1, 3).unwrap();
    let mut store = SessionStore::new(config, ManualTimer::new()).with_tick_ms(30_000);
    add_all(&mut store, &["A", "B"]);
    store.dispatch(Action::StartSession).unwrap();

    expire(&mut store);
    assert_eq!(store.phase().remaining_ms(), Some(90_000));

    store
        .dispatch(Action::AdjustTimerLength {
            delta_ms: 3 * MINUTE_MS as i64,
        })
        .unwrap();
    assert_eq!(store.phase().remaining_ms(), Some(90_000));
    assert_eq!(store.snapshot().config.timer_length_ms(), 5 * MINUTE_MS);

    for _ in 0..3 {
        expire(&mut store);
    }
    assert!(matches!(store.phase(), PhaseState::Turn { rotation_index: 1, .. }));
    assert_eq!(store.phase().remaining_ms(), Some(5 * MINUTE_MS));
}

#[test]
fn test_break_adjustment_applies_to_next_break() {
    let mut store = new_store(1, 1, 1);
    add_all(&mut store, &["A"]);
    store.dispatch(Action::StartSession).unwrap();
    store
        .dispatch(Action::AdjustBreakLength {
            delta_ms: 4 * MINUTE_MS as i64,
        })
        .unwrap();
    expire(&mut store);
    assert_eq!(store.phase(), PhaseState::Break { remaining_ms: 5 * MINUTE_MS });
}

#[test]
fn test_sub_minute_adjustments_rejected() {
    let mut store = new_store(1, 1, 1);
    for action in [
        Action::AdjustTimerLength {
            delta_ms: -(MINUTE_MS as i64),
        },
        Action::AdjustBreakLength { delta_ms: -1 },
        Action::AdjustRotationsPerBreak { delta: -1 },
    ] {
        let before = store.snapshot();
        let err = store.dispatch(action).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.snapshot(), before);
    }
}

#[test]
fn test_emptying_roster_in_turn_forces_idle() {
    let mut store = new_store(1, 1, 5);
    add_all(&mut store, &["A", "B"]);
    store.dispatch(Action::StartSession).unwrap();
    expire(&mut store);
    expire(&mut store);

    let a = id_of(&store, "A");
    let b = id_of(&store, "B");
    store.dispatch(Action::RemoveMember { id: a }).unwrap();
    assert!(!store.phase().is_idle());
    store.dispatch(Action::RemoveMember { id: b }).unwrap();

    let snap = store.snapshot();
    assert!(snap.phase.is_idle());
    assert_eq!(snap.rotation_index, 0);
    assert_eq!(snap.rotation_counter, 0);
    assert!(store.pending_timer().is_none());
}

#[test]
fn test_emptying_roster_in_break_forces_idle() {
    let mut store = new_store(1, 1, 1);
    add_all(&mut store, &["A"]);
    store.dispatch(Action::StartSession).unwrap();
    expire(&mut store);
    assert!(matches!(store.phase(), PhaseState::Break { .. }));

    let a = id_of(&store, "A");
    let events = store.dispatch(Action::RemoveMember { id: a }).unwrap();
    assert!(events.iter().any(|e| matches!(e, Event::SessionStopped { .. })));
    assert!(store.phase().is_idle());
}

#[test]
fn test_restart_after_forced_idle() {
    let mut store = new_store(1, 1, 2);
    add_all(&mut store, &["A"]);
    store.dispatch(Action::StartSession).unwrap();
    let a = id_of(&store, "A");
    store.dispatch(Action::RemoveMember { id: a }).unwrap();

    add_all(&mut store, &["B", "C"]);
    store.dispatch(Action::StartSession).unwrap();
    assert_eq!(roles(&store), pair("B", "C"));
}

#[test]
fn test_removing_driver_hands_wheel_back() {
    let mut store = new_store(1, 1, 5);
    add_all(&mut store, &["A", "B", "C"]);
    store.dispatch(Action::StartSession).unwrap();
    expire(&mut store);
    assert_eq!(roles(&store), pair("B", "C"));

    let b = id_of(&store, "B");
    store.dispatch(Action::RemoveMember { id: b }).unwrap();
    assert_eq!(roles(&store), pair("A", "C"));
}

#[test]
fn test_removal_during_break_continues_from_folded_index() {
    let mut store = new_store(1, 1, 1);
    add_all(&mut store, &["A", "B", "C"]);
    store.dispatch(Action::StartSession).unwrap();
    expire(&mut store);
    assert!(matches!(store.phase(), PhaseState::Break { .. }));

    let a = id_of(&store, "A");
    store.dispatch(Action::RemoveMember { id: a }).unwrap();
    let snap = store.snapshot();
    assert!(matches!(snap.phase, PhaseState::Break { .. }));
    assert_eq!(snap.rotation_index, 0);
    assert_eq!(snap.up_next.unwrap().driver.name, "C");

    expire(&mut store);
    assert!(matches!(store.phase(), PhaseState::Turn { rotation_index: 1, .. }));
    assert_eq!(roles(&store), pair("C", "B"));
}

#[test]
fn test_oversized_rotation_adjustment_rejected() {
    let mut store = new_store(1, 1, 6);
    add_all(&mut store, &["A"]);
    let before = store.snapshot();
    let err = store
        .dispatch(Action::AdjustRotationsPerBreak { delta: i64::MAX })
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::RotationsOutOfRange(_))
    ));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_adding_member_mid_session_joins_rotation() {
    let mut store = new_store(1, 1, 5);
    add_all(&mut store, &["A", "B"]);
    store.dispatch(Action::StartSession).unwrap();
    expire(&mut store);
    add_all(&mut store, &["C"]);
    assert_eq!(roles(&store), pair("B", "C"));
}

#[test]
fn test_start_while_running_rejected() {
    let mut store = new_store(1, 1, 2);
    add_all(&mut store, &["A"]);
    store.dispatch(Action::StartSession).unwrap();
    let token = store.pending_timer();
    let err = store.dispatch(Action::StartSession).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::SessionAlreadyRunning)
    ));
    assert_eq!(store.pending_timer(), token);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_removal_keeps_index_in_range(
        size in 2usize..8,
        rotations in 1u32..4,
        expiries in 0usize..20,
        remove_at in 0usize..8,
    ) {
        let mut store = new_store(1, 1, rotations);
        let names: Vec<String> = (0..size).map(|i| format!("m{i}")).collect();
        for name in &names {
            store.dispatch(Action::AddMember { name: name.clone() }).unwrap();
        }
        store.dispatch(Action::StartSession).unwrap();
        for _ in 0..expiries {
            expire(&mut store);
        }

        let position = remove_at % size;
        let id = store.roster().get(position).unwrap().id.clone();
        store.dispatch(Action::RemoveMember { id }).unwrap();

        let snap = store.snapshot();
        prop_assert!(snap.rotation_index < snap.roster.len());
        match snap.phase {
            PhaseState::Turn { rotation_index, .. } => {
                prop_assert_eq!(rotation_index, snap.rotation_index);
                prop_assert!(snap.roles.is_some());
            }
            PhaseState::Break { .. } => prop_assert!(snap.roles.is_none()),
            PhaseState::Idle => prop_assert!(false, "session stopped with members left"),
        }

        // The next turn picks up right after the revalidated index.
        let index = snap.rotation_index;
        let roster = snap.roster;
        expire(&mut store);
        if let PhaseState::Turn { rotation_index, .. } = store.phase() {
            let driver = store.snapshot().roles.unwrap().driver;
            prop_assert_eq!(rotation_index, index + 1);
            prop_assert_eq!(&driver, &roster[(index + 1) % roster.len()]);
        }
    }

    #[test]
    fn prop_counter_never_exceeds_cadence(
        rotations in 1u32..6,
        expiries in 0usize..30,
        delta in -5i64..5,
    ) {
        let mut store = new_store(1, 1, rotations);
        store.dispatch(Action::AddMember { name: "A".into() }).unwrap();
        store.dispatch(Action::StartSession).unwrap();
        for _ in 0..expiries {
            expire(&mut store);
        }
        let _ = store.dispatch(Action::AdjustRotationsPerBreak { delta });
        let snap = store.snapshot();
        prop_assert!(snap.rotation_counter <= snap.config.rotations_per_break());
    }
}
