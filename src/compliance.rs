//! Compliance evaluation for daily biometric snapshots
//!
//! Each metric is checked against a two-tier threshold table. The critical
//! tier is checked first; a metric that trips it skips its warning check.
//! The final status is the worst tier any metric reached, while the
//! severity score adds up every penalty.

use crate::models::{BiometricSnapshot, ComplianceResult, ComplianceStatus};

/// ---------------------------------------------------------------------------
/// Thresholds
/// ---------------------------------------------------------------------------

pub const SLEEP_CRITICAL_HOURS: f64 = 5.0;
pub const SLEEP_WARNING_HOURS: f64 = 6.0;
pub const RESTING_HR_CRITICAL_BPM: i64 = 95;
pub const RESTING_HR_WARNING_BPM: i64 = 80;
pub const RECOVERY_CRITICAL_SCORE: i64 = 40;
pub const RECOVERY_WARNING_SCORE: i64 = 60;

const WARNING_PENALTY: u32 = 1;
const CRITICAL_PENALTY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
  Warning,
  Critical,
}

impl Tier {
  fn penalty(self) -> u32 {
    match self {
      Tier::Warning => WARNING_PENALTY,
      Tier::Critical => CRITICAL_PENALTY,
    }
  }

  fn status(self) -> ComplianceStatus {
    match self {
      Tier::Warning => ComplianceStatus::Warning,
      Tier::Critical => ComplianceStatus::Critical,
    }
  }
}

/// A triggered rule: which tier fired and why
type Finding = (Tier, String);

fn check_sleep(sleep_hours: f64) -> Option<Finding> {
  if sleep_hours < SLEEP_CRITICAL_HOURS {
    Some((
      Tier::Critical,
      format!(
        "Sleep ({}h) is below the {}h critical threshold.",
        sleep_hours, SLEEP_CRITICAL_HOURS
      ),
    ))
  } else if sleep_hours < SLEEP_WARNING_HOURS {
    Some((
      Tier::Warning,
      format!(
        "Sleep ({}h) is below the {}h recommended minimum.",
        sleep_hours, SLEEP_WARNING_HOURS
      ),
    ))
  } else {
    None
  }
}

fn check_resting_hr(resting_hr: i64) -> Option<Finding> {
  if resting_hr > RESTING_HR_CRITICAL_BPM {
    Some((
      Tier::Critical,
      format!(
        "Resting HR ({} bpm) is above the {} bpm critical threshold.",
        resting_hr, RESTING_HR_CRITICAL_BPM
      ),
    ))
  } else if resting_hr > RESTING_HR_WARNING_BPM {
    Some((
      Tier::Warning,
      format!(
        "Resting HR ({} bpm) is elevated above {} bpm.",
        resting_hr, RESTING_HR_WARNING_BPM
      ),
    ))
  } else {
    None
  }
}

fn check_recovery(recovery_score: i64) -> Option<Finding> {
  if recovery_score < RECOVERY_CRITICAL_SCORE {
    Some((
      Tier::Critical,
      format!(
        "Recovery score ({}) is below the {} critical threshold.",
        recovery_score, RECOVERY_CRITICAL_SCORE
      ),
    ))
  } else if recovery_score < RECOVERY_WARNING_SCORE {
    Some((
      Tier::Warning,
      format!(
        "Recovery score ({}) is below {}.",
        recovery_score, RECOVERY_WARNING_SCORE
      ),
    ))
  } else {
    None
  }
}

/// Evaluate one snapshot. Total and side-effect free.
pub fn evaluate(snapshot: &BiometricSnapshot) -> ComplianceResult {
  let findings = [
    check_sleep(snapshot.sleep_hours),
    check_resting_hr(snapshot.resting_hr),
    check_recovery(snapshot.recovery_score),
  ];

  let mut status = ComplianceStatus::Optimal;
  let mut severity_score = 0;
  let mut reasons = Vec::new();

  for (tier, reason) in findings.into_iter().flatten() {
    // Critical is sticky: a later warning never downgrades it
    status = status.max(tier.status());
    severity_score += tier.penalty();
    reasons.push(reason);
  }

  ComplianceResult {
    status,
    severity_score,
    reasons,
    priority_message: status.priority_message().to_string(),
    biometrics: snapshot.clone(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::mock_snapshot;

  #[test]
  fn test_all_metrics_in_range_is_optimal() {
    for (sleep, hr, recovery) in [(6.0, 80, 60), (8.0, 52, 95), (7.2, 65, 60)] {
      let result = evaluate(&mock_snapshot(sleep, hr, recovery));
      assert_eq!(result.status, ComplianceStatus::Optimal);
      assert_eq!(result.severity_score, 0);
      assert!(result.reasons.is_empty());
      assert_eq!(result.priority_message, ComplianceStatus::Optimal.priority_message());
    }
  }

  #[test]
  fn test_critical_sleep_reports_literal_value() {
    let result = evaluate(&mock_snapshot(4.9, 60, 80));

    assert_eq!(result.status, ComplianceStatus::Critical);
    assert!(result.severity_score >= 3);
    let sleep_reasons: Vec<_> = result.reasons.iter().filter(|r| r.starts_with("Sleep")).collect();
    assert_eq!(sleep_reasons.len(), 1);
    assert!(sleep_reasons[0].contains("4.9"));
  }

  #[test]
  fn test_critical_tier_skips_warning_check() {
    let result = evaluate(&mock_snapshot(4.0, 60, 80));
    assert_eq!(result.severity_score, 3);
    assert_eq!(result.reasons.len(), 1);
  }

  #[test]
  fn test_hr_warning_only() {
    let result = evaluate(&mock_snapshot(6.5, 85, 70));

    assert_eq!(result.status, ComplianceStatus::Warning);
    assert_eq!(result.severity_score, 1);
    assert_eq!(result.reasons.len(), 1);
    assert!(result.reasons[0].contains("85"));
  }

  #[test]
  fn test_two_criticals_accumulate_in_order() {
    let result = evaluate(&mock_snapshot(7.0, 96, 39));

    assert_eq!(result.status, ComplianceStatus::Critical);
    assert_eq!(result.severity_score, 6);
    assert_eq!(result.reasons.len(), 2);
    assert!(result.reasons[0].starts_with("Resting HR"));
    assert!(result.reasons[1].starts_with("Recovery score"));
  }

  #[test]
  fn test_critical_is_not_downgraded_by_later_warning() {
    // Sleep critical, recovery warning
    let result = evaluate(&mock_snapshot(4.5, 70, 55));

    assert_eq!(result.status, ComplianceStatus::Critical);
    assert_eq!(result.severity_score, 4);
    assert_eq!(result.reasons.len(), 2);
    assert_eq!(result.priority_message, ComplianceStatus::Critical.priority_message());
  }

  #[test]
  fn test_warning_then_critical_escalates() {
    // Sleep warning, HR critical
    let result = evaluate(&mock_snapshot(5.5, 100, 75));

    assert_eq!(result.status, ComplianceStatus::Critical);
    assert_eq!(result.severity_score, 4);
    assert!(result.reasons[0].starts_with("Sleep"));
    assert!(result.reasons[1].starts_with("Resting HR"));
  }

  #[test]
  fn test_threshold_boundaries() {
    // Exactly on the boundary is not a trigger
    assert_eq!(evaluate(&mock_snapshot(5.0, 95, 40)).severity_score, 3);
    assert_eq!(evaluate(&mock_snapshot(6.0, 80, 60)).severity_score, 0);
    assert_eq!(evaluate(&mock_snapshot(5.99, 81, 59)).severity_score, 3);
  }

  #[test]
  fn test_zeroed_snapshot_is_total() {
    let result = evaluate(&BiometricSnapshot::default());

    // Sleep 0 and recovery 0 are critical, HR 0 passes
    assert_eq!(result.status, ComplianceStatus::Critical);
    assert_eq!(result.severity_score, 6);
    assert_eq!(result.biometrics, BiometricSnapshot::default());
  }
}
