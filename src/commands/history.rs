//! History commands: record, list, complete, stats

use crate::compliance::evaluate;
use crate::models::{BiometricSnapshot, HistoryEntry, NewHistoryEntry, UserStats};
use crate::state::AppState;

/// Evaluate a snapshot and record it with the planned workout
pub fn log_entry(
  state: &AppState,
  snapshot: BiometricSnapshot,
  plan: String,
  recommendation: String,
  completed: bool,
) -> Result<HistoryEntry, String> {
  let compliance = evaluate(&snapshot);

  state
    .store
    .append(NewHistoryEntry {
      user_id: snapshot.user_id.clone(),
      biometrics: snapshot,
      compliance: compliance.summary(),
      workout_plan: plan,
      recommendation,
      completed,
    })
    .map_err(|e| format!("Failed to log entry: {}", e))
}

pub fn get_history(
  state: &AppState,
  user_id: &str,
  limit: Option<usize>,
  days: Option<u32>,
) -> Vec<HistoryEntry> {
  state.store.list(user_id, limit, days)
}

pub fn set_workout_completion(
  state: &AppState,
  user_id: &str,
  entry_id: i64,
  completed: bool,
) -> Result<HistoryEntry, String> {
  state
    .store
    .set_completion(user_id, entry_id, completed)
    .map_err(|e| format!("Failed to update workout: {}", e))
}

pub fn get_stats(state: &AppState, user_id: &str) -> UserStats {
  state.store.stats(user_id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AuditorConfig;
  use crate::models::ComplianceStatus;
  use crate::test_utils::mock_snapshot;
  use tempfile::TempDir;

  fn setup_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let config = AuditorConfig {
      history_file: dir.path().join("history.json"),
      ..AuditorConfig::default()
    };
    (dir, AppState::initialize(config).unwrap())
  }

  #[test]
  fn test_log_entry_evaluates_snapshot() {
    let (_dir, state) = setup_state();

    let entry = log_entry(
      &state,
      mock_snapshot(7.0, 96, 39),
      "Heavy Squats".to_string(),
      "Rest today.".to_string(),
      false,
    )
    .unwrap();

    assert_eq!(entry.compliance.status, ComplianceStatus::Critical);
    assert_eq!(entry.compliance.severity_score, 6);
    assert_eq!(entry.recommendation_preview, "Rest today....");
    assert_eq!(get_history(&state, "athlete", None, None).len(), 1);
  }

  #[test]
  fn test_completion_round_trip() {
    let (_dir, state) = setup_state();
    log_entry(&state, mock_snapshot(7.0, 60, 80), "Easy Run".into(), String::new(), false).unwrap();

    let entry = set_workout_completion(&state, "athlete", 1, true).unwrap();
    assert!(entry.completed);
    assert_eq!(get_stats(&state, "athlete").completion_rate, 100.0);

    let err = set_workout_completion(&state, "athlete", 9, true).unwrap_err();
    assert!(err.contains("Entry 9 not found"));
  }
}
