//! Trend analysis over a user's audited history
//!
//! Simple heuristics: means over the window, a two-halves
//! percent-change comparison per metric, a status tally, and fixed-threshold
//! insight strings. Nothing here is a time-series model.

use serde::{Deserialize, Serialize};

use crate::history::HistoryStore;
use crate::models::{ComplianceStatus, HistoryEntry};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Percent change (exclusive) that separates a trend from "stable"
pub const TREND_CHANGE_PCT: f64 = 5.0;

const LOW_SLEEP_HOURS: f64 = 7.0;
const GOOD_SLEEP_HOURS: f64 = 8.0;
const ELEVATED_HR_BPM: f64 = 70.0;
const LOW_HR_BPM: f64 = 60.0;
const CRITICAL_SHARE_PCT: f64 = 20.0;
const OPTIMAL_SHARE_PCT: f64 = 70.0;
const LOW_RECOVERY_SCORE: f64 = 60.0;

const NO_DATA_MESSAGE: &str = "No data available for trend analysis";
const KEEP_LOGGING_INSIGHT: &str = "Keep logging data for personalized insights!";

/// ---------------------------------------------------------------------------
/// Trend Direction
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
  Improving,
  Declining,
  Stable,
  InsufficientData,
}

impl TrendDirection {
  /// Compare the mean of the later half against the earlier half.
  ///
  /// This is a raw percent-change label: a rising resting HR reads as
  /// "improving" even though a lower HR is physiologically better.
  pub fn classify(first_half: &[f64], second_half: &[f64]) -> Self {
    if first_half.is_empty() || second_half.is_empty() {
      return Self::InsufficientData;
    }

    let avg_first = mean(first_half);
    let avg_second = mean(second_half);

    // A zero baseline has no percent change; fall back to the sign of the move
    if avg_first == 0.0 {
      return match avg_second.partial_cmp(&0.0) {
        Some(std::cmp::Ordering::Greater) => Self::Improving,
        Some(std::cmp::Ordering::Less) => Self::Declining,
        _ => Self::Stable,
      };
    }

    let change_pct = (avg_second - avg_first) / avg_first * 100.0;

    if change_pct > TREND_CHANGE_PCT {
      Self::Improving
    } else if change_pct < -TREND_CHANGE_PCT {
      Self::Declining
    } else {
      Self::Stable
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Improving => "improving",
      Self::Declining => "declining",
      Self::Stable => "stable",
      Self::InsufficientData => "insufficient_data",
    }
  }
}

impl std::fmt::Display for TrendDirection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// ---------------------------------------------------------------------------
/// Report Types
/// ---------------------------------------------------------------------------

/// Window means. Sleep keeps one decimal, the integer metrics are rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
  pub sleep_hours: f64,
  pub resting_hr: i64,
  pub recovery_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrends {
  pub sleep: TrendDirection,
  pub heart_rate: TrendDirection,
  pub recovery: TrendDirection,
}

/// Occurrences of each compliance status in the window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusDistribution {
  #[serde(rename = "Optimal")]
  pub optimal: usize,
  #[serde(rename = "Warning")]
  pub warning: usize,
  #[serde(rename = "Critical")]
  pub critical: usize,
}

impl StatusDistribution {
  pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a ComplianceStatus>) -> Self {
    let mut dist = Self::default();
    for status in statuses {
      match status {
        ComplianceStatus::Optimal => dist.optimal += 1,
        ComplianceStatus::Warning => dist.warning += 1,
        ComplianceStatus::Critical => dist.critical += 1,
      }
    }
    dist
  }

  pub fn count(&self, status: ComplianceStatus) -> usize {
    match status {
      ComplianceStatus::Optimal => self.optimal,
      ComplianceStatus::Warning => self.warning,
      ComplianceStatus::Critical => self.critical,
    }
  }

  pub fn total(&self) -> usize {
    self.optimal + self.warning + self.critical
  }

  /// Share of entries with `status`, as a percentage
  pub fn share_pct(&self, status: ComplianceStatus) -> f64 {
    match self.total() {
      0 => 0.0,
      total => self.count(status) as f64 / total as f64 * 100.0,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
  pub user_id: String,
  pub period: String,
  pub days_analyzed: u32,
  pub total_entries: usize,
  pub averages: MetricAverages,
  pub trends: MetricTrends,
  pub compliance_distribution: StatusDistribution,
  pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum TrendReport {
  /// Nothing logged in the window
  NoData {
    user_id: String,
    days_analyzed: u32,
    message: String,
  },
  Analyzed(TrendAnalysis),
}

impl TrendReport {
  pub fn no_data(user_id: &str, days: u32) -> Self {
    Self::NoData {
      user_id: user_id.to_string(),
      days_analyzed: days,
      message: NO_DATA_MESSAGE.to_string(),
    }
  }

  pub fn is_no_data(&self) -> bool {
    matches!(self, Self::NoData { .. })
  }

  pub fn analysis(&self) -> Option<&TrendAnalysis> {
    match self {
      Self::Analyzed(analysis) => Some(analysis),
      Self::NoData { .. } => None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Trend Computation
/// ---------------------------------------------------------------------------

/// Analyze a user's last `days` days of history
pub fn trends(store: &HistoryStore, user_id: &str, days: u32) -> TrendReport {
  let entries = store.list(user_id, None, Some(days));
  match TrendAnalysis::compute(user_id, days, &entries) {
    Some(analysis) => TrendReport::Analyzed(analysis),
    None => TrendReport::no_data(user_id, days),
  }
}

impl TrendAnalysis {
  /// Compute the analysis over chronologically ordered entries.
  /// Returns None when there are no entries.
  pub fn compute(user_id: &str, days: u32, entries: &[HistoryEntry]) -> Option<Self> {
    if entries.is_empty() {
      return None;
    }

    let sleep: Vec<f64> = entries.iter().map(|e| e.biometrics.sleep_hours).collect();
    let hr: Vec<f64> = entries.iter().map(|e| e.biometrics.resting_hr as f64).collect();
    let recovery: Vec<f64> = entries
      .iter()
      .map(|e| e.biometrics.recovery_score as f64)
      .collect();

    let avg_sleep = mean(&sleep);
    let avg_hr = mean(&hr);
    let avg_recovery = mean(&recovery);

    let mid = entries.len() / 2;
    let trends = MetricTrends {
      sleep: TrendDirection::classify(&sleep[..mid], &sleep[mid..]),
      heart_rate: TrendDirection::classify(&hr[..mid], &hr[mid..]),
      recovery: TrendDirection::classify(&recovery[..mid], &recovery[mid..]),
    };

    let distribution = StatusDistribution::tally(entries.iter().map(|e| &e.compliance.status));
    let insights = generate_insights(avg_sleep, avg_hr, avg_recovery, &distribution);

    Some(Self {
      user_id: user_id.to_string(),
      period: format!("Last {} days", days),
      days_analyzed: days,
      total_entries: entries.len(),
      averages: MetricAverages {
        sleep_hours: round_to(avg_sleep, 1),
        resting_hr: avg_hr.round_ties_even() as i64,
        recovery_score: avg_recovery.round_ties_even() as i64,
      },
      trends,
      compliance_distribution: distribution,
      insights,
    })
  }
}

/// Fixed-threshold insight strings, in check order. Falls back to a single
/// "keep logging" line when nothing fires.
pub fn generate_insights(
  avg_sleep: f64,
  avg_hr: f64,
  avg_recovery: f64,
  distribution: &StatusDistribution,
) -> Vec<String> {
  let mut insights = Vec::new();

  if avg_sleep < LOW_SLEEP_HOURS {
    insights.push(format!(
      "Your average sleep ({:.1}h) is below optimal. Prioritize 7-8 hours for better recovery.",
      avg_sleep
    ));
  } else if avg_sleep >= GOOD_SLEEP_HOURS {
    insights.push(format!("Excellent sleep average ({:.1}h). Keep it up!", avg_sleep));
  }

  if avg_hr > ELEVATED_HR_BPM {
    insights.push(format!(
      "Your average resting HR ({:.0} bpm) is elevated. Consider more recovery days or stress management.",
      avg_hr
    ));
  } else if avg_hr < LOW_HR_BPM {
    insights.push(format!("Great cardiovascular fitness (avg HR: {:.0} bpm)!", avg_hr));
  }

  let critical_pct = distribution.share_pct(ComplianceStatus::Critical);
  if critical_pct > CRITICAL_SHARE_PCT {
    insights.push(format!(
      "{:.0}% of your sessions were 'Critical' status. Consider reducing training volume or intensity.",
      critical_pct
    ));
  }

  let optimal_pct = distribution.share_pct(ComplianceStatus::Optimal);
  if optimal_pct > OPTIMAL_SHARE_PCT {
    insights.push(format!(
      "{:.0}% of sessions at 'Optimal' status. Your recovery strategy is working well!",
      optimal_pct
    ));
  }

  if avg_recovery < LOW_RECOVERY_SCORE {
    insights.push(format!(
      "Low average recovery score ({:.0}/100). Focus on sleep quality and stress reduction.",
      avg_recovery
    ));
  }

  if insights.is_empty() {
    insights.push(KEEP_LOGGING_INSIGHT.to_string());
  }

  insights
}

fn mean(values: &[f64]) -> f64 {
  values.iter().sum::<f64>() / values.len() as f64
}

/// Round the exact binary value to `decimals` places, ties to even.
/// Scaling first would turn 4.4500000000000002 into an exact tie.
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
  format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
