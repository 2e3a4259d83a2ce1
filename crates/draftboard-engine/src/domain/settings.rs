//! Draft settings patches.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use draftboard_core::error::DomainError;
use draftboard_core::model::{DraftSession, OrderingMode};

/// Accepted pick timer, in seconds.
pub const PICK_TIMER_RANGE: RangeInclusive<i32> = 5..=3600;

/// Accepted round cap.
pub const ROUND_COUNT_RANGE: RangeInclusive<i32> = 1..=50;

/// A partial update of session settings.
///
/// The outer `Option` is "leave unchanged"; for nullable settings the inner
/// `None` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New ordering mode.
    pub ordering_mode: Option<OrderingMode>,
    /// New scheduled start.
    pub starts_at: Option<Option<DateTime<Utc>>>,
    /// New pick timer.
    pub pick_timer_seconds: Option<Option<i32>>,
    /// New advisory round cap.
    pub round_count: Option<Option<i32>>,
}

impl SettingsPatch {
    /// `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordering_mode.is_none()
            && self.starts_at.is_none()
            && self.pick_timer_seconds.is_none()
            && self.round_count.is_none()
    }

    /// Checks bounds on every non-null numeric setting.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty patch or an
    /// out-of-range value.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Err(DomainError::Validation(
                "settings patch changes nothing".to_owned(),
            ));
        }
        if let Some(Some(seconds)) = self.pick_timer_seconds {
            check_range("pick_timer_seconds", seconds, &PICK_TIMER_RANGE)?;
        }
        if let Some(Some(rounds)) = self.round_count {
            check_range("round_count", rounds, &ROUND_COUNT_RANGE)?;
        }
        Ok(())
    }

    /// Writes the patched fields into `session`.
    pub fn apply_to(&self, session: &mut DraftSession) {
        if let Some(mode) = self.ordering_mode {
            session.ordering_mode = mode;
        }
        if let Some(starts_at) = self.starts_at {
            session.starts_at = starts_at;
        }
        if let Some(seconds) = self.pick_timer_seconds {
            session.pick_timer_seconds = seconds;
        }
        if let Some(rounds) = self.round_count {
            session.round_count = rounds;
        }
    }
}

fn check_range(field: &str, value: i32, range: &RangeInclusive<i32>) -> Result<(), DomainError> {
    if !range.contains(&value) {
        return Err(DomainError::Validation(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_is_rejected() {
        match SettingsPatch::default().validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("changes nothing")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_timer_bounds() {
        let patch = |seconds| SettingsPatch {
            pick_timer_seconds: Some(Some(seconds)),
            ..SettingsPatch::default()
        };

        assert!(patch(5).validate().is_ok());
        assert!(patch(3600).validate().is_ok());
        assert!(patch(4).validate().is_err());
        assert!(patch(3601).validate().is_err());
    }

    #[test]
    fn test_round_cap_bounds() {
        let patch = |rounds| SettingsPatch {
            round_count: Some(Some(rounds)),
            ..SettingsPatch::default()
        };

        assert!(patch(1).validate().is_ok());
        assert!(patch(50).validate().is_ok());
        assert!(patch(0).validate().is_err());
        assert!(patch(51).validate().is_err());
    }

    #[test]
    fn test_clearing_a_nullable_setting_is_valid() {
        let patch = SettingsPatch {
            pick_timer_seconds: Some(None),
            ..SettingsPatch::default()
        };

        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_apply_only_touches_patched_fields() {
        let mut session = DraftSession {
            pick_timer_seconds: Some(90),
            round_count: Some(6),
            ..DraftSession::new(1)
        };
        let patch = SettingsPatch {
            ordering_mode: Some(OrderingMode::Linear),
            pick_timer_seconds: Some(None),
            ..SettingsPatch::default()
        };

        patch.apply_to(&mut session);

        assert_eq!(session.ordering_mode, OrderingMode::Linear);
        assert_eq!(session.pick_timer_seconds, None);
        assert_eq!(session.round_count, Some(6));
    }
}
