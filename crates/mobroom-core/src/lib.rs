//! # Mobroom Core Library
//!
//! This library provides the core logic for Mobroom, a mob/pair programming
//! timer. A roster of members takes turns as Driver and Navigator on a fixed
//! interval, with a break after a configured number of rotations.
//!
//! ## Architecture
//!
//! - **Roster**: ordered members; insertion order is rotation order
//! - **Rotation**: pure Driver/Navigator assignment from a rotation index
//! - **Phase Machine**: Idle / Turn / Break state machine with no clock of
//!   its own; the owner reports elapsed time
//! - **Session Store**: single owner of roster, machine and timer; the only
//!   mutation path is `dispatch(Action)` plus timer expiry
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionStore`]: dispatch, snapshots and update subscription
//! - [`PhaseMachine`]: rotation and break transitions
//! - [`TimerFacility`]: cancellable notifications (`TokioTimer`, `ManualTimer`)
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod plan;
pub mod roster;
pub mod rotation;
pub mod storage;
pub mod store;
pub mod timer;
pub mod view;
pub mod window;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use plan::{plan_session, PlannedKind, PlannedPhase};
pub use roster::{Member, MemberId, Roster};
pub use rotation::{assign_roles, OwnedRoles, Roles};
pub use storage::Config;
pub use store::{Action, SessionStore, SessionUpdate, Snapshot};
pub use timer::{
    ManualTimer, PhaseMachine, PhaseState, SessionConfig, TimerFacility, TimerToken, TokioTimer,
};
pub use window::{apply_profile, TracingWindowBridge, WindowBridge, WindowProfile};
