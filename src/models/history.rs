use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BiometricSnapshot, ComplianceSummary};

/// Calendar context captured when an entry is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
  pub day_of_week: String,
  pub week_number: u32,
}

/// A single audited day in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub id: i64,
  pub timestamp: DateTime<Utc>,
  pub biometrics: BiometricSnapshot,
  pub compliance: ComplianceSummary,
  pub workout_plan: String,
  pub recommendation_preview: String,
  pub completed: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
  pub metadata: EntryMetadata,
}

/// For appending new entries (without id, timestamp, metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
  pub user_id: String,
  pub biometrics: BiometricSnapshot,
  pub compliance: ComplianceSummary,
  pub workout_plan: String,
  /// Full recommendation text; only a preview is stored
  pub recommendation: String,
  #[serde(default)]
  pub completed: bool,
}

/// Per-user log plus running counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
  pub entries: Vec<HistoryEntry>,
  pub created_at: DateTime<Utc>,
  pub total_workouts: u32,
  pub completed_workouts: u32,
}

impl UserRecord {
  pub fn new(created_at: DateTime<Utc>) -> Self {
    Self {
      entries: Vec::new(),
      created_at,
      total_workouts: 0,
      completed_workouts: 0,
    }
  }
}

/// Whole-store state as written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
  #[serde(default)]
  pub users: BTreeMap<String, UserRecord>,
}

/// Completion statistics for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
  pub user_id: String,
  pub total_workouts: u32,
  pub completed_workouts: u32,
  /// Percentage, one decimal place
  pub completion_rate: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub member_since: Option<DateTime<Utc>>,
  pub total_entries: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl UserStats {
  /// Payload for a user that has never logged anything
  pub fn empty(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      total_workouts: 0,
      completed_workouts: 0,
      completion_rate: 0.0,
      member_since: None,
      total_entries: 0,
      message: Some("No data yet - start logging your workouts!".to_string()),
    }
  }
}
