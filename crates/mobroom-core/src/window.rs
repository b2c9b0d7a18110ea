//! Outbound window-manager calls.
//!
//! The scheduler never touches the window. Front ends react to session
//! updates or user input and push one of the fixed [`WindowProfile`]s
//! through a [`WindowBridge`]; calls are fire-and-forget.

use serde::Serialize;
use tracing::debug;

use crate::timer::PhaseState;

pub trait WindowBridge {
    /// Clamped to `0.0..=1.0` by callers going through [`apply_profile`].
    fn set_opacity(&mut self, opacity: f64);
    fn maximize(&mut self);
    fn set_always_on_top(&mut self, enabled: bool);
    fn set_ignore_mouse_events(&mut self, ignore: bool);
}

/// Window arrangement for one screen of the app.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowProfile {
    pub opacity: f64,
    pub maximize: bool,
    pub always_on_top: bool,
    pub ignore_mouse_events: bool,
}

impl WindowProfile {
    /// Roster and options editor: opaque, maximized, behind other windows,
    /// clickable.
    pub fn editor() -> Self {
        Self {
            opacity: 1.0,
            maximize: true,
            always_on_top: false,
            ignore_mouse_events: false,
        }
    }

    /// Countdown overlay shown while someone drives: translucent, on top,
    /// click-through so it never steals input.
    pub fn overlay(opacity: f64) -> Self {
        Self {
            opacity,
            maximize: false,
            always_on_top: true,
            ignore_mouse_events: true,
        }
    }

    /// Profile a front end shows for `phase`.
    pub fn for_phase(phase: PhaseState, overlay_opacity: f64) -> Self {
        match phase {
            PhaseState::Turn { .. } => Self::overlay(overlay_opacity),
            PhaseState::Idle | PhaseState::Break { .. } => Self::editor(),
        }
    }
}

pub fn apply_profile<B: WindowBridge + ?Sized>(bridge: &mut B, profile: WindowProfile) {
    bridge.set_opacity(profile.opacity.clamp(0.0, 1.0));
    if profile.maximize {
        bridge.maximize();
    }
    bridge.set_always_on_top(profile.always_on_top);
    bridge.set_ignore_mouse_events(profile.ignore_mouse_events);
}

/// Bridge for headless front ends: every call becomes a debug log line.
#[derive(Debug, Default)]
pub struct TracingWindowBridge;

impl WindowBridge for TracingWindowBridge {
    fn set_opacity(&mut self, opacity: f64) {
        debug!(opacity, "window: set opacity");
    }

    fn maximize(&mut self) {
        debug!("window: maximize");
    }

    fn set_always_on_top(&mut self, enabled: bool) {
        debug!(enabled, "window: always on top");
    }

    fn set_ignore_mouse_events(&mut self, ignore: bool) {
        debug!(ignore, "window: ignore mouse events");
    }
}
