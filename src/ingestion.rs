//! Snapshot construction from raw device readings
//!
//! Wearables do not always report every field. Absent readings fall back to
//! neutral defaults and the recovery score is derived from sleep and
//! resting HR when the device does not supply one.

use crate::models::BiometricSnapshot;

const DEFAULT_SLEEP_HOURS: f64 = 7.0;
const DEFAULT_RESTING_HR: i64 = 60;
const DEFAULT_RECOVERY_SCORE: i64 = 70;

/// Sleep target used to scale the sleep component
const SLEEP_TARGET_HOURS: f64 = 8.0;

impl BiometricSnapshot {
  /// Build a snapshot from optional readings, deriving the recovery score
  pub fn from_readings(
    user_id: impl Into<String>,
    sleep_hours: Option<f64>,
    resting_hr: Option<i64>,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      sleep_hours: sleep_hours.unwrap_or(DEFAULT_SLEEP_HOURS),
      resting_hr: resting_hr.unwrap_or(DEFAULT_RESTING_HR),
      recovery_score: recovery_score(sleep_hours, resting_hr),
    }
  }
}

/// Recovery score (0-100): sleep component (0-50) plus HR component (0-50)
///
/// 50 bpm or lower earns the full HR component, 70 bpm earns half, and
/// 90 bpm or higher earns nothing.
pub fn recovery_score(sleep_hours: Option<f64>, resting_hr: Option<i64>) -> i64 {
  let (sleep, hr) = match (sleep_hours, resting_hr) {
    (Some(s), Some(h)) => (s, h),
    _ => return DEFAULT_RECOVERY_SCORE,
  };

  let sleep_component = (sleep / SLEEP_TARGET_HOURS * 50.0).min(50.0);

  let hr_component = match hr {
    h if h <= 50 => 50.0,
    h if h <= 70 => 50.0 - (h - 50) as f64 * 1.25,
    h => (25.0 - (h - 70) as f64 * 1.25).max(0.0),
  };

  (sleep_component + hr_component).round_ties_even() as i64
}
