//! Rotation and break state machine.
//!
//! The machine has no thread and no clock. The owner reports elapsed time
//! with `elapse()`; when the running phase's countdown reaches zero the
//! machine moves to the next phase and resets `remaining` from the
//! configured length at that instant.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Turn -> (Turn)* -> Break -> Turn -> ...
//!   ^                                   |
//!   +------- roster emptied ------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut machine = PhaseMachine::new(SessionConfig::default());
//! machine.start(roster.size())?;
//! // For every timer notification:
//! machine.elapse(elapsed_ms); // Returns Some(Event) when something changed
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::settings::SessionConfig;
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseState {
    Idle,
    Turn {
        rotation_index: usize,
        remaining_ms: u64,
    },
    Break {
        remaining_ms: u64,
    },
}

impl PhaseState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PhaseState::Idle)
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        match *self {
            PhaseState::Idle => None,
            PhaseState::Turn { remaining_ms, .. } | PhaseState::Break { remaining_ms } => {
                Some(remaining_ms)
            }
        }
    }

    fn remaining_mut(&mut self) -> Option<&mut u64> {
        match self {
            PhaseState::Idle => None,
            PhaseState::Turn { remaining_ms, .. } | PhaseState::Break { remaining_ms } => {
                Some(remaining_ms)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhaseMachine {
    config: SessionConfig,
    phase: PhaseState,
    /// Survives a Break so the following Turn continues the rotation.
    rotation_index: usize,
    /// Completed turns since the last break, never above `rotations_per_break`.
    rotation_counter: u32,
}

impl PhaseMachine {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: PhaseState::Idle,
            rotation_index: 0,
            rotation_counter: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> PhaseState {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn rotation_index(&self) -> usize {
        self.rotation_index
    }

    pub fn rotation_counter(&self) -> u32 {
        self.rotation_counter
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.phase.remaining_ms()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Leave `Idle` and begin the first turn.
    ///
    /// # Errors
    /// `SessionAlreadyRunning` outside `Idle`, `EmptyRoster` when there is
    /// nobody to drive. State is unchanged on error.
    pub fn start(&mut self, roster_size: usize) -> Result<Event> {
        if !self.phase.is_idle() {
            return Err(ValidationError::SessionAlreadyRunning.into());
        }
        if roster_size == 0 {
            return Err(CoreError::EmptyRoster);
        }

        self.rotation_index = 0;
        self.rotation_counter = 0;
        self.phase = PhaseState::Turn {
            rotation_index: 0,
            remaining_ms: self.config.timer_length_ms(),
        };
        info!(duration_ms = self.config.timer_length_ms(), "session started");
        Ok(Event::SessionStarted {
            duration_ms: self.config.timer_length_ms(),
            at: Utc::now(),
        })
    }

    /// Count `elapsed_ms` off the running phase.
    ///
    /// Returns `None` in `Idle` or when nothing elapsed, a `Countdown` event
    /// while time remains, and the transition event once it hits zero.
    pub fn elapse(&mut self, elapsed_ms: u64) -> Option<Event> {
        if elapsed_ms == 0 {
            return None;
        }
        let remaining = self.phase.remaining_mut()?;
        *remaining = remaining.saturating_sub(elapsed_ms);
        if *remaining == 0 {
            return Some(self.expire());
        }
        Some(Event::Countdown {
            remaining_ms: *remaining,
            at: Utc::now(),
        })
    }

    /// Revalidate the rotation index after the roster lost the member at
    /// `position`. `new_size` is the roster length after removal.
    ///
    /// The index is folded onto the current driver position first, so it
    /// always ends below `new_size`. Returns `SessionStopped` when the
    /// roster emptied under a running session.
    pub fn member_removed(&mut self, position: usize, new_size: usize) -> Option<Event> {
        if new_size == 0 {
            let was_running = !self.phase.is_idle();
            self.reset();
            if was_running {
                info!("roster emptied, session stopped");
                return Some(Event::SessionStopped { at: Utc::now() });
            }
            return None;
        }

        let old_size = new_size + 1;
        let mut current = self.rotation_index % old_size;
        if position <= current {
            current = current.saturating_sub(1);
        }
        debug!(from = self.rotation_index, to = current, "rotation index revalidated");
        self.rotation_index = current;
        if let PhaseState::Turn { rotation_index, .. } = &mut self.phase {
            *rotation_index = current;
        }
        None
    }

    /// Change the configured turn length. An in-flight countdown keeps its
    /// current `remaining`; the new length applies from the next turn.
    pub fn adjust_timer_length(&mut self, delta_ms: i64) -> Result<Event> {
        self.config.adjust_timer_length(delta_ms)?;
        Ok(self.config_adjusted())
    }

    pub fn adjust_break_length(&mut self, delta_ms: i64) -> Result<Event> {
        self.config.adjust_break_length(delta_ms)?;
        Ok(self.config_adjusted())
    }

    /// Change the break cadence, clamping the counter to the new maximum.
    pub fn adjust_rotations_per_break(&mut self, delta: i64) -> Result<Event> {
        let max = self.config.adjust_rotations_per_break(delta)?;
        self.rotation_counter = self.rotation_counter.min(max);
        Ok(self.config_adjusted())
    }

    /// Return to `Idle` with all counters cleared.
    pub fn reset(&mut self) {
        self.phase = PhaseState::Idle;
        self.rotation_index = 0;
        self.rotation_counter = 0;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self) -> Event {
        let at = Utc::now();
        match self.phase {
            PhaseState::Turn { .. } => {
                if self.rotation_counter + 1 >= self.config.rotations_per_break() {
                    self.rotation_counter = 0;
                    self.enter_break(at)
                } else {
                    self.rotation_counter += 1;
                    self.enter_turn(at)
                }
            }
            PhaseState::Break { .. } => self.enter_turn(at),
            PhaseState::Idle => unreachable!("idle has no countdown to expire"),
        }
    }

    fn enter_turn(&mut self, at: chrono::DateTime<Utc>) -> Event {
        self.rotation_index = self.rotation_index.wrapping_add(1);
        let duration_ms = self.config.timer_length_ms();
        self.phase = PhaseState::Turn {
            rotation_index: self.rotation_index,
            remaining_ms: duration_ms,
        };
        info!(
            rotation_index = self.rotation_index,
            rotation_counter = self.rotation_counter,
            "turn started"
        );
        Event::TurnStarted {
            rotation_index: self.rotation_index,
            rotation_counter: self.rotation_counter,
            duration_ms,
            at,
        }
    }

    fn enter_break(&mut self, at: chrono::DateTime<Utc>) -> Event {
        let duration_ms = self.config.break_length_ms();
        self.phase = PhaseState::Break {
            remaining_ms: duration_ms,
        };
        info!(duration_ms, "break started");
        Event::BreakStarted { duration_ms, at }
    }

    fn config_adjusted(&self) -> Event {
        debug!(config = ?self.config, "session config adjusted");
        Event::ConfigAdjusted {
            config: self.config,
            rotation_counter: self.rotation_counter,
            at: Utc::now(),
        }
    }
}
