//! Session store: the single owner of roster, phase machine and timer.
//!
//! All mutation goes through [`SessionStore::dispatch`] (user actions) or
//! [`SessionStore::on_timer`] (expired timer tokens). Both run to completion
//! before returning, validate before touching state, and broadcast a
//! [`SessionUpdate`] for every event they produce.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::roster::{Member, MemberId, Roster};
use crate::rotation::{assign_roles, OwnedRoles};
use crate::timer::{PhaseMachine, PhaseState, SessionConfig, TimerFacility, TimerToken};

/// Default countdown granularity.
pub const DEFAULT_TICK_MS: u64 = 1_000;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Everything the view layer may ask the session to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddMember { name: String },
    RemoveMember { id: MemberId },
    AdjustTimerLength { delta_ms: i64 },
    AdjustBreakLength { delta_ms: i64 },
    AdjustRotationsPerBreak { delta: i64 },
    StartSession,
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub roster: Vec<Member>,
    pub phase: PhaseState,
    pub rotation_index: usize,
    pub rotation_counter: u32,
    pub config: SessionConfig,
    /// Current driver and navigator; only set during a turn.
    pub roles: Option<OwnedRoles>,
    /// Who takes the wheel at the next turn entry.
    pub up_next: Option<OwnedRoles>,
}

/// Broadcast to subscribers after every successful state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUpdate {
    pub event: Event,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    token: TimerToken,
    after_ms: u64,
}

pub struct SessionStore<T: TimerFacility> {
    roster: Roster,
    machine: PhaseMachine,
    timer: T,
    armed: Option<ArmedTimer>,
    tick_ms: u64,
    updates: broadcast::Sender<SessionUpdate>,
}

impl<T: TimerFacility> SessionStore<T> {
    pub fn new(config: SessionConfig, timer: T) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            roster: Roster::new(),
            machine: PhaseMachine::new(config),
            timer,
            armed: None,
            tick_ms: DEFAULT_TICK_MS,
            updates,
        }
    }

    /// Countdown granularity. `0` arms one timer for the whole phase.
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        let phase = self.machine.phase();
        let rotation_index = self.machine.rotation_index();

        let roles = match phase {
            PhaseState::Turn { rotation_index, .. } => assign_roles(&self.roster, rotation_index)
                .ok()
                .map(|r| r.detach()),
            _ => None,
        };
        let next_index = match phase {
            PhaseState::Idle => rotation_index,
            _ => rotation_index.wrapping_add(1),
        };
        let up_next = assign_roles(&self.roster, next_index)
            .ok()
            .map(|r| r.detach());

        Snapshot {
            roster: self.roster.members().to_vec(),
            phase,
            rotation_index,
            rotation_counter: self.machine.rotation_counter(),
            config: *self.machine.config(),
            roles,
            up_next,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn phase(&self) -> PhaseState {
        self.machine.phase()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Token of the notification the running phase is waiting on.
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.armed.map(|a| a.token)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one action atomically.
    ///
    /// Returns the events produced, in order. On error nothing changed.
    ///
    /// # Errors
    /// Validation errors for bad input, `NotFound` for an unknown member id.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Event>> {
        debug!(?action, "dispatch");
        let events = match action {
            Action::AddMember { name } => {
                let member = self.roster.add_member(&name)?.clone();
                info!(id = %member.id, name = %member.name, "member added");
                vec![Event::MemberAdded {
                    member,
                    at: Utc::now(),
                }]
            }
            Action::RemoveMember { id } => {
                let (position, member) = match self.roster.remove_member(&id) {
                    Ok(removed) => removed,
                    Err(err) => {
                        warn!(%id, "remove ignored: {err}");
                        return Err(err);
                    }
                };
                info!(id = %member.id, name = %member.name, position, "member removed");
                let mut events = vec![Event::MemberRemoved {
                    member,
                    position,
                    at: Utc::now(),
                }];
                events.extend(self.machine.member_removed(position, self.roster.size()));
                events
            }
            Action::AdjustTimerLength { delta_ms } => {
                vec![self.machine.adjust_timer_length(delta_ms)?]
            }
            Action::AdjustBreakLength { delta_ms } => {
                vec![self.machine.adjust_break_length(delta_ms)?]
            }
            Action::AdjustRotationsPerBreak { delta } => {
                vec![self.machine.adjust_rotations_per_break(delta)?]
            }
            Action::StartSession => {
                let event = self
                    .machine
                    .start(self.roster.size())
                    .map_err(|err| match err {
                        CoreError::EmptyRoster => {
                            CoreError::from(ValidationError::EmptyCollection("roster".into()))
                        }
                        other => other,
                    })?;
                vec![event]
            }
        };

        self.sync_timer();
        self.publish(&events);
        Ok(events)
    }

    /// Deliver an expired timer token.
    ///
    /// Tokens other than the one currently armed are stale (cancelled or
    /// from a previous phase) and are ignored.
    pub fn on_timer(&mut self, token: TimerToken) -> Option<Event> {
        let armed = match self.armed {
            Some(armed) if armed.token == token => armed,
            _ => {
                debug!(token = token.id(), "stale timer token ignored");
                return None;
            }
        };
        self.armed = None;

        let event = self.machine.elapse(armed.after_ms);
        self.sync_timer();
        if let Some(event) = &event {
            self.publish(std::slice::from_ref(event));
        }
        event
    }

    /// Cancel any pending timer. The store stays readable.
    pub fn shutdown(&mut self) {
        if let Some(armed) = self.armed.take() {
            self.timer.cancel(armed.token);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Keep exactly one timer armed while a phase is running and none
    /// while idle.
    fn sync_timer(&mut self) {
        match self.machine.remaining_ms() {
            None => self.shutdown(),
            Some(remaining) if self.armed.is_none() => {
                let after_ms = if self.tick_ms == 0 {
                    remaining
                } else {
                    remaining.min(self.tick_ms)
                };
                let token = self.timer.schedule(after_ms);
                self.armed = Some(ArmedTimer { token, after_ms });
            }
            Some(_) => {}
        }
    }

    fn publish(&self, events: &[Event]) {
        if events.is_empty() || self.updates.receiver_count() == 0 {
            return;
        }
        let snapshot = self.snapshot();
        for event in events {
            let _ = self.updates.send(SessionUpdate {
                event: event.clone(),
                snapshot: snapshot.clone(),
            });
        }
    }
}

impl<T: TimerFacility> Drop for SessionStore<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
