//! Dry-run of a session.
//!
//! Drives a [`SessionStore`] on a [`ManualTimer`] to list the phases a
//! roster would go through, without waiting on a real clock.

use serde::Serialize;

use crate::error::Result;
use crate::rotation::OwnedRoles;
use crate::store::{Action, SessionStore};
use crate::timer::{ManualTimer, PhaseState, SessionConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedKind {
    Turn,
    Break,
}

/// One phase of the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedPhase {
    pub kind: PlannedKind,
    /// Offset from session start.
    pub starts_at_ms: u64,
    pub duration_ms: u64,
    pub rotation_index: usize,
    /// Set for turns only.
    pub roles: Option<OwnedRoles>,
}

/// First `phases` phases of a session for `names` under `config`.
///
/// # Errors
/// Fails if any name is blank or the roster is empty.
pub fn plan_session<S: AsRef<str>>(
    names: &[S],
    config: SessionConfig,
    phases: usize,
) -> Result<Vec<PlannedPhase>> {
    let mut store = SessionStore::new(config, ManualTimer::new()).with_tick_ms(0);
    for name in names {
        store.dispatch(Action::AddMember {
            name: name.as_ref().to_string(),
        })?;
    }
    store.dispatch(Action::StartSession)?;

    let mut plan = Vec::with_capacity(phases);
    let mut offset_ms = 0;
    while plan.len() < phases {
        let snapshot = store.snapshot();
        let (kind, duration_ms) = match snapshot.phase {
            PhaseState::Turn { remaining_ms, .. } => (PlannedKind::Turn, remaining_ms),
            PhaseState::Break { remaining_ms } => (PlannedKind::Break, remaining_ms),
            PhaseState::Idle => break,
        };
        plan.push(PlannedPhase {
            kind,
            starts_at_ms: offset_ms,
            duration_ms,
            rotation_index: snapshot.rotation_index,
            roles: snapshot.roles,
        });
        offset_ms += duration_ms;

        let Some(token) = store.timer_mut().take_pending() else {
            break;
        };
        store.on_timer(token);
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::MINUTE_MS;

    #[test]
    fn plan_inserts_breaks_on_cadence() {
        let config = SessionConfig::from_minutes(5, 10, 2).unwrap();
        let plan = plan_session(&["A", "B", "C"], config, 5).unwrap();
        let kinds: Vec<_> = plan.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PlannedKind::Turn,
                PlannedKind::Turn,
                PlannedKind::Break,
                PlannedKind::Turn,
                PlannedKind::Turn
            ]
        );
        assert_eq!(plan[2].starts_at_ms, 10 * MINUTE_MS);
        assert_eq!(plan[3].starts_at_ms, 20 * MINUTE_MS);
        assert_eq!(plan[3].roles.as_ref().unwrap().driver.name, "C");
        assert!(plan[2].roles.is_none());
    }

    #[test]
    fn plan_requires_members() {
        let none: [&str; 0] = [];
        assert!(plan_session(&none, SessionConfig::default(), 3).is_err());
    }
}
