use serde::{Deserialize, Serialize};

use super::BiometricSnapshot;

/// ---------------------------------------------------------------------------
/// Compliance Status
/// ---------------------------------------------------------------------------

/// Readiness tier. Ordering follows severity, so `max` picks the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ComplianceStatus {
  #[default]
  Optimal,
  Warning,
  Critical,
}

impl ComplianceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Optimal => "Optimal",
      Self::Warning => "Warning",
      Self::Critical => "Critical",
    }
  }

  /// Fixed guidance line shown alongside the status
  pub fn priority_message(&self) -> &'static str {
    match self {
      Self::Critical => "CRITICAL: Rest and recover. Do not train today.",
      Self::Warning => "WARNING: Proceed with caution. Reduce intensity and volume.",
      Self::Optimal => "OPTIMAL: Cleared for training. Execute the plan as written.",
    }
  }
}

impl std::fmt::Display for ComplianceStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for ComplianceStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Optimal" => Ok(Self::Optimal),
      "Warning" => Ok(Self::Warning),
      "Critical" => Ok(Self::Critical),
      _ => Err(format!("Unknown compliance status: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Evaluation Output
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
  pub status: ComplianceStatus,

  /// Sum of every triggered penalty (warning = 1, critical = 3)
  pub severity_score: u32,

  /// One line per triggered rule, in sleep, heart-rate, recovery order
  pub reasons: Vec<String>,

  pub priority_message: String,

  pub biometrics: BiometricSnapshot,
}

impl ComplianceResult {
  pub fn summary(&self) -> ComplianceSummary {
    ComplianceSummary {
      status: self.status,
      severity_score: self.severity_score,
      reasons: self.reasons.clone(),
    }
  }
}

/// The slice of a compliance result that is kept in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComplianceSummary {
  pub status: ComplianceStatus,
  #[serde(default)]
  pub severity_score: u32,
  #[serde(default)]
  pub reasons: Vec<String>,
}

impl From<&ComplianceResult> for ComplianceSummary {
  fn from(result: &ComplianceResult) -> Self {
    result.summary()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_ordering_tracks_severity() {
    assert!(ComplianceStatus::Critical > ComplianceStatus::Warning);
    assert!(ComplianceStatus::Warning > ComplianceStatus::Optimal);
    assert_eq!(
      ComplianceStatus::Warning.max(ComplianceStatus::Critical),
      ComplianceStatus::Critical
    );
  }

  #[test]
  fn test_status_string_round_trip() {
    for status in [
      ComplianceStatus::Optimal,
      ComplianceStatus::Warning,
      ComplianceStatus::Critical,
    ] {
      assert_eq!(status.to_string().parse::<ComplianceStatus>().unwrap(), status);
    }
    assert!("critical".parse::<ComplianceStatus>().is_err());
  }

  #[test]
  fn test_status_serializes_as_capitalized_name() {
    let json = serde_json::to_string(&ComplianceStatus::Warning).unwrap();
    assert_eq!(json, "\"Warning\"");
  }
}
