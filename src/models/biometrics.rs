use serde::{Deserialize, Serialize};

/// One day's readings for a single user, as handed over by the device feed.
///
/// Missing fields deserialize to zero; range checks are the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricSnapshot {
  pub user_id: String,
  pub sleep_hours: f64,
  pub resting_hr: i64,
  pub recovery_score: i64,
}

impl Default for BiometricSnapshot {
  fn default() -> Self {
    Self {
      user_id: "default".to_string(),
      sleep_hours: 0.0,
      resting_hr: 0,
      recovery_score: 0,
    }
  }
}

impl BiometricSnapshot {
  pub fn new(user_id: impl Into<String>, sleep_hours: f64, resting_hr: i64, recovery_score: i64) -> Self {
    Self {
      user_id: user_id.into(),
      sleep_hours,
      resting_hr,
      recovery_score,
    }
  }
}
