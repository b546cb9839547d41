use std::sync::Arc;

use crate::coach::{Coach, CoachOutcome, CoachRequest, RuleBasedRecommender};
use crate::models::BiometricSnapshot;
use crate::state::AppState;

/// Run a coaching session with the offline recommender
pub async fn run_coach(
  state: &AppState,
  snapshot: BiometricSnapshot,
  plan: String,
  completed: bool,
) -> Result<CoachOutcome, String> {
  let coach = Coach::new(Arc::clone(&state.store), RuleBasedRecommender)
    .with_trend_days(state.config.trend_days);

  coach
    .session(CoachRequest {
      snapshot,
      plan,
      completed,
    })
    .await
    .map_err(|e| format!("Coach session failed: {}", e))
}
