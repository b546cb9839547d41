use crate::analysis::{trends, TrendReport};
use crate::compliance::evaluate;
use crate::models::{BiometricSnapshot, ComplianceResult};
use crate::state::AppState;

pub fn evaluate_snapshot(snapshot: BiometricSnapshot) -> ComplianceResult {
  evaluate(&snapshot)
}

/// Trend report over `days`, or the configured default window
pub fn get_trends(state: &AppState, user_id: &str, days: Option<u32>) -> TrendReport {
  let days = days.filter(|d| *d > 0).unwrap_or(state.config.trend_days);
  trends(&state.store, user_id, days)
}
