use serde::Serialize;

use crate::error::{Result, ValidationError};

/// One minute in milliseconds; durations move in whole-minute steps.
pub const MINUTE_MS: u64 = 60_000;

/// Configured phase lengths and break cadence.
///
/// All constructors and adjusters validate, so a `SessionConfig` value is
/// always usable: both lengths are whole minutes of at least one minute and
/// there is at least one rotation per break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    timer_length_ms: u64,
    break_length_ms: u64,
    rotations_per_break: u32,
}

impl SessionConfig {
    /// # Errors
    /// Returns a validation error if any value breaks the constraints.
    pub fn new(timer_length_ms: u64, break_length_ms: u64, rotations_per_break: u32) -> Result<Self> {
        Ok(Self {
            timer_length_ms: validate_length("timer length", saturating_i64(timer_length_ms))?,
            break_length_ms: validate_length("break length", saturating_i64(break_length_ms))?,
            rotations_per_break: validate_rotations(i64::from(rotations_per_break))?,
        })
    }

    pub fn from_minutes(timer_min: u64, break_min: u64, rotations_per_break: u32) -> Result<Self> {
        Self::new(
            timer_min.saturating_mul(MINUTE_MS),
            break_min.saturating_mul(MINUTE_MS),
            rotations_per_break,
        )
    }

    pub fn timer_length_ms(&self) -> u64 {
        self.timer_length_ms
    }

    pub fn break_length_ms(&self) -> u64 {
        self.break_length_ms
    }

    pub fn rotations_per_break(&self) -> u32 {
        self.rotations_per_break
    }

    /// Change the turn length by `delta_ms` and return the new length.
    ///
    /// # Errors
    /// Leaves the value untouched if the result is under a minute or not a
    /// whole minute.
    pub fn adjust_timer_length(&mut self, delta_ms: i64) -> Result<u64> {
        let next = saturating_i64(self.timer_length_ms).saturating_add(delta_ms);
        self.timer_length_ms = validate_length("timer length", next)?;
        Ok(self.timer_length_ms)
    }

    /// Same as [`Self::adjust_timer_length`] for the break length.
    pub fn adjust_break_length(&mut self, delta_ms: i64) -> Result<u64> {
        let next = saturating_i64(self.break_length_ms).saturating_add(delta_ms);
        self.break_length_ms = validate_length("break length", next)?;
        Ok(self.break_length_ms)
    }

    pub fn adjust_rotations_per_break(&mut self, delta: i64) -> Result<u32> {
        let next = i64::from(self.rotations_per_break).saturating_add(delta);
        self.rotations_per_break = validate_rotations(next)?;
        Ok(self.rotations_per_break)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timer_length_ms: 10 * MINUTE_MS,
            break_length_ms: 10 * MINUTE_MS,
            rotations_per_break: 6,
        }
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn validate_length(field: &'static str, value_ms: i64) -> Result<u64> {
    if value_ms < MINUTE_MS as i64 {
        return Err(ValidationError::DurationTooShort {
            field,
            value_ms,
            min_ms: MINUTE_MS,
        }
        .into());
    }
    if value_ms % MINUTE_MS as i64 != 0 {
        return Err(ValidationError::NotWholeMinute { field, value_ms }.into());
    }
    Ok(value_ms as u64)
}

fn validate_rotations(value: i64) -> Result<u32> {
    if value < 1 {
        return Err(ValidationError::RotationsBelowOne(value).into());
    }
    u32::try_from(value).map_err(|_| ValidationError::RotationsOutOfRange(value).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn new_rejects_sub_minute_lengths() {
        assert!(SessionConfig::new(59_999, MINUTE_MS, 1).is_err());
        assert!(SessionConfig::new(MINUTE_MS, 0, 1).is_err());
        assert!(SessionConfig::new(MINUTE_MS, MINUTE_MS, 0).is_err());
        assert!(SessionConfig::new(MINUTE_MS, MINUTE_MS, 1).is_ok());
    }

    #[test]
    fn new_rejects_partial_minutes() {
        let err = SessionConfig::new(90_000, MINUTE_MS, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotWholeMinute { value_ms: 90_000, .. })
        ));
    }

    #[test]
    fn adjust_timer_length_stops_at_one_minute() {
        let mut config = SessionConfig::from_minutes(2, 5, 3).unwrap();
        assert_eq!(config.adjust_timer_length(-(MINUTE_MS as i64)).unwrap(), MINUTE_MS);
        assert!(config.adjust_timer_length(-(MINUTE_MS as i64)).is_err());
        assert_eq!(config.timer_length_ms(), MINUTE_MS);
        assert_eq!(config.adjust_timer_length(MINUTE_MS as i64).unwrap(), 2 * MINUTE_MS);
    }

    #[test]
    fn adjust_break_length_rejects_partial_minute_delta() {
        let mut config = SessionConfig::default();
        assert!(config.adjust_break_length(30_000).is_err());
        assert_eq!(config.break_length_ms(), 10 * MINUTE_MS);
    }

    #[test]
    fn adjust_rotations_per_break_floor_is_one() {
        let mut config = SessionConfig::from_minutes(1, 1, 2).unwrap();
        assert_eq!(config.adjust_rotations_per_break(-1).unwrap(), 1);
        let err = config.adjust_rotations_per_break(-1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::RotationsBelowOne(0))
        ));
        assert_eq!(config.rotations_per_break(), 1);
    }

    #[test]
    fn adjust_rotations_per_break_rejects_overflow() {
        let mut config = SessionConfig::from_minutes(1, 1, 6).unwrap();
        let err = config.adjust_rotations_per_break(i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::RotationsOutOfRange(i64::MAX))
        ));
        assert_eq!(config.rotations_per_break(), 6);

        let ceiling = i64::from(u32::MAX) - 6;
        assert!(config.adjust_rotations_per_break(ceiling + 1).is_err());
        assert_eq!(config.adjust_rotations_per_break(ceiling).unwrap(), u32::MAX);
    }
}
