//! Coaching session orchestration
//!
//! One session takes a snapshot and a planned workout through the whole
//! pipeline: compliance check, historical trend context, a recommendation,
//! and finally a history entry. The store is synchronous, so its work runs
//! on tokio's blocking pool.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::analysis::{self, TrendReport, DEFAULT_TREND_DAYS};
use crate::compliance::evaluate;
use crate::history::{HistoryError, HistoryStore};
use crate::models::{BiometricSnapshot, ComplianceResult, ComplianceStatus, HistoryEntry, NewHistoryEntry};

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum CoachError {
  #[error(transparent)]
  History(#[from] HistoryError),

  #[error("Recommendation failed: {0}")]
  Recommendation(String),

  #[error("Background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

/// ---------------------------------------------------------------------------
/// Recommendation Source
/// ---------------------------------------------------------------------------

/// Turns a compliance result into advice text, e.g. an LLM client
pub trait Recommender: Send + Sync {
  fn recommend(
    &self,
    compliance: &ComplianceResult,
    plan: &str,
    trends: &TrendReport,
  ) -> impl Future<Output = Result<String, CoachError>> + Send;
}

/// Offline recommender built from the status, reasons and trend insights
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedRecommender;

impl RuleBasedRecommender {
  /// Number of trend insights appended to the advice
  const MAX_INSIGHTS: usize = 2;

  pub fn compose(compliance: &ComplianceResult, plan: &str, trends: &TrendReport) -> String {
    let mut lines = vec![compliance.priority_message.clone()];

    lines.push(match compliance.status {
      ComplianceStatus::Critical => format!(
        "Swap \"{}\" for full rest or 20-30 minutes of easy mobility.",
        plan
      ),
      ComplianceStatus::Warning => format!(
        "Keep \"{}\" but cut the volume by about a third and stay at conversational effort.",
        plan
      ),
      ComplianceStatus::Optimal => format!("Go ahead with \"{}\" as planned.", plan),
    });

    lines.extend(compliance.reasons.iter().map(|r| format!("- {}", r)));

    if let Some(analysis) = trends.analysis() {
      lines.extend(analysis.insights.iter().take(Self::MAX_INSIGHTS).cloned());
    }

    lines.join("\n")
  }
}

impl Recommender for RuleBasedRecommender {
  fn recommend(
    &self,
    compliance: &ComplianceResult,
    plan: &str,
    trends: &TrendReport,
  ) -> impl Future<Output = Result<String, CoachError>> + Send {
    let text = Self::compose(compliance, plan, trends);
    async move { Ok(text) }
  }
}

/// ---------------------------------------------------------------------------
/// Coach Session
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachRequest {
  pub snapshot: BiometricSnapshot,
  pub plan: String,
  #[serde(default)]
  pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachOutcome {
  pub recommendation: String,
  pub compliance: ComplianceResult,
  pub entry: HistoryEntry,
  /// History before this session was recorded
  pub trends: TrendReport,
}

pub struct Coach<R> {
  store: Arc<HistoryStore>,
  recommender: R,
  trend_days: u32,
}

impl<R: Recommender> Coach<R> {
  pub fn new(store: Arc<HistoryStore>, recommender: R) -> Self {
    Self {
      store,
      recommender,
      trend_days: DEFAULT_TREND_DAYS,
    }
  }

  pub fn with_trend_days(mut self, days: u32) -> Self {
    self.trend_days = days;
    self
  }

  pub fn store(&self) -> &Arc<HistoryStore> {
    &self.store
  }

  /// Evaluate, gather trends, recommend, and record one audited day
  pub async fn session(&self, request: CoachRequest) -> Result<CoachOutcome, CoachError> {
    let compliance = evaluate(&request.snapshot);
    let user_id = request.snapshot.user_id.clone();

    let store = Arc::clone(&self.store);
    let days = self.trend_days;
    let trend_user = user_id.clone();
    let trends =
      tokio::task::spawn_blocking(move || analysis::trends(&store, &trend_user, days)).await?;

    let recommendation = self
      .recommender
      .recommend(&compliance, &request.plan, &trends)
      .await?;

    let new = NewHistoryEntry {
      user_id: user_id.clone(),
      biometrics: request.snapshot,
      compliance: compliance.summary(),
      workout_plan: request.plan,
      recommendation: recommendation.clone(),
      completed: request.completed,
    };
    let store = Arc::clone(&self.store);
    let entry = tokio::task::spawn_blocking(move || store.append(new)).await??;

    info!(
      user_id = %user_id,
      entry_id = entry.id,
      status = %compliance.status,
      "Coach session recorded"
    );

    Ok(CoachOutcome {
      recommendation,
      compliance,
      entry,
      trends,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
