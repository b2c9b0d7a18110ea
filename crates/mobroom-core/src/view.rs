//! Derived values for presentation.
//!
//! Pure functions over a [`Snapshot`]; nothing here mutates the session.

use serde::Serialize;

use crate::store::Snapshot;
use crate::timer::{SessionConfig, MINUTE_MS};

/// One dot per rotation in the current break cycle; filled dots are
/// completed turns.
pub fn rotation_progress(snapshot: &Snapshot) -> Vec<bool> {
    let total = snapshot.config.rotations_per_break();
    (0..total).map(|i| i < snapshot.rotation_counter).collect()
}

/// Milliseconds rounded to whole minutes for display.
pub fn whole_minutes(ms: u64) -> u64 {
    (ms + MINUTE_MS / 2) / MINUTE_MS
}

/// Option stepper values and their guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionsView {
    pub timer_minutes: u64,
    pub break_minutes: u64,
    pub rotations_per_break: u32,
    /// Minutes of work between two breaks.
    pub minutes_between_breaks: u64,
    pub can_decrease_timer: bool,
    pub can_decrease_break: bool,
    pub can_decrease_rotations: bool,
}

impl OptionsView {
    pub fn from_config(config: &SessionConfig) -> Self {
        let timer_minutes = whole_minutes(config.timer_length_ms());
        let break_minutes = whole_minutes(config.break_length_ms());
        let rotations_per_break = config.rotations_per_break();
        Self {
            timer_minutes,
            break_minutes,
            rotations_per_break,
            minutes_between_breaks: timer_minutes.saturating_mul(u64::from(rotations_per_break)),
            can_decrease_timer: timer_minutes > 1,
            can_decrease_break: break_minutes > 1,
            can_decrease_rotations: rotations_per_break > 1,
        }
    }
}

/// `mm:ss` countdown label.
pub fn format_remaining(ms: u64) -> String {
    let secs = ms.div_ceil(1_000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
