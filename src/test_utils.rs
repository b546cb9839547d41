//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Isolated history stores in temp directories
//! - Mock data factories
//! - Helper assertions

use chrono::{DateTime, Datelike, Duration, Utc};
use tempfile::TempDir;

use crate::compliance::evaluate;
use crate::history::{preview, HistoryStore};
use crate::models::{BiometricSnapshot, EntryMetadata, HistoryEntry, NewHistoryEntry};

/// ---------------------------------------------------------------------------
/// Store Test Utilities
/// ---------------------------------------------------------------------------

/// Create a history store backed by `history.json` in a fresh temp directory.
/// Keep the returned `TempDir` alive for as long as the store is used.
pub fn setup_test_store() -> (TempDir, HistoryStore) {
  let dir = tempfile::tempdir().expect("Failed to create temp dir");
  let store = HistoryStore::open(dir.path().join("history.json"))
    .expect("Failed to open test store");
  (dir, store)
}

/// Append one evaluated entry per `(sleep_hours, resting_hr, recovery_score)`
pub fn seed_entries(
  store: &HistoryStore,
  user_id: &str,
  readings: &[(f64, i64, i64)],
) -> Vec<HistoryEntry> {
  readings
    .iter()
    .map(|(sleep, hr, recovery)| {
      store
        .append(mock_new_entry(user_id, mock_snapshot(*sleep, *hr, *recovery)))
        .expect("Failed to seed history entry")
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_snapshot(sleep_hours: f64, resting_hr: i64, recovery_score: i64) -> BiometricSnapshot {
  BiometricSnapshot::new("athlete", sleep_hours, resting_hr, recovery_score)
}

/// New entry for `user_id` with compliance evaluated from the snapshot
pub fn mock_new_entry(user_id: &str, snapshot: BiometricSnapshot) -> NewHistoryEntry {
  let compliance = evaluate(&snapshot);
  NewHistoryEntry {
    user_id: user_id.to_string(),
    biometrics: BiometricSnapshot {
      user_id: user_id.to_string(),
      ..snapshot
    },
    compliance: compliance.summary(),
    workout_plan: "5K Easy Run".to_string(),
    recommendation: "Cleared for training. Keep the effort conversational.".to_string(),
    completed: false,
  }
}

/// Stored entry built without a store, timestamped now
pub fn mock_history_entry(id: i64, snapshot: BiometricSnapshot) -> HistoryEntry {
  let now = datetime_now();
  let user_id = snapshot.user_id.clone();
  let new = mock_new_entry(&user_id, snapshot);
  HistoryEntry {
    id,
    timestamp: now,
    biometrics: new.biometrics,
    compliance: new.compliance,
    workout_plan: new.workout_plan,
    recommendation_preview: preview(&new.recommendation),
    completed: false,
    completed_at: None,
    metadata: EntryMetadata {
      day_of_week: now.format("%A").to_string(),
      week_number: now.iso_week().week(),
    },
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Timestamp `days` whole days before the current instant
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

pub fn datetime_now() -> DateTime<Utc> {
  Utc::now()
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ComplianceStatus;

  #[test]
  fn test_setup_store_starts_empty() {
    let (dir, store) = setup_test_store();

    assert!(store.path().starts_with(dir.path()));
    assert!(store.list("athlete", None, None).is_empty());
    // Nothing is written until the first mutation
    assert!(!store.path().exists());
  }

  #[test]
  fn test_seed_entries_returns_correct_count() {
    let (_dir, store) = setup_test_store();

    let entries = seed_entries(&store, "athlete", &[(7.0, 60, 80), (4.5, 90, 30)]);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].compliance.status, ComplianceStatus::Critical);
    assert_eq!(store.stats("athlete").total_workouts, 2);
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let new = mock_new_entry("runner", mock_snapshot(6.5, 85, 70));
    assert_eq!(new.biometrics.user_id, "runner");
    assert_eq!(new.compliance.status, ComplianceStatus::Warning);
    assert_eq!(new.compliance.severity_score, 1);

    let entry = mock_history_entry(3, mock_snapshot(7.0, 60, 80));
    assert_eq!(entry.id, 3);
    assert!(entry.recommendation_preview.ends_with("..."));
  }
}
