use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::roster::Member;
use crate::timer::SessionConfig;

/// Every state change in the session produces an Event.
/// The store broadcasts them to subscribers alongside a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MemberAdded {
        member: Member,
        at: DateTime<Utc>,
    },
    MemberRemoved {
        member: Member,
        position: usize,
        at: DateTime<Utc>,
    },
    /// Session left `Idle`; first turn begins at rotation 0.
    SessionStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// A turn expired and the next one began.
    TurnStarted {
        rotation_index: usize,
        rotation_counter: u32,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    BreakStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// The running countdown moved without changing phase.
    Countdown {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Roster emptied while running; the session is back to `Idle`.
    SessionStopped {
        at: DateTime<Utc>,
    },
    ConfigAdjusted {
        config: SessionConfig,
        rotation_counter: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case tag, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MemberAdded { .. } => "member_added",
            Event::MemberRemoved { .. } => "member_removed",
            Event::SessionStarted { .. } => "session_started",
            Event::TurnStarted { .. } => "turn_started",
            Event::BreakStarted { .. } => "break_started",
            Event::Countdown { .. } => "countdown",
            Event::SessionStopped { .. } => "session_stopped",
            Event::ConfigAdjusted { .. } => "config_adjusted",
        }
    }

    /// True for events that moved the session into a different phase.
    pub fn is_phase_change(&self) -> bool {
        matches!(
            self,
            Event::SessionStarted { .. }
                | Event::TurnStarted { .. }
                | Event::BreakStarted { .. }
                | Event::SessionStopped { .. }
        )
    }
}
