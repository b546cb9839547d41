pub mod analysis;
pub mod coach;
pub mod history;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::config::AuditorConfig;
use crate::models::BiometricSnapshot;
use crate::state::AppState;

/// ---------------------------------------------------------------------------
/// CLI Definition
/// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
  name = "biometric-auditor",
  version,
  about = "Biometric Auditor - training readiness checks and history insights"
)]
pub struct Cli {
  /// History store file (overrides AUDITOR_HISTORY_FILE)
  #[arg(long, global = true)]
  pub history_file: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Check today's readings against the compliance thresholds
  Evaluate {
    #[command(flatten)]
    readings: ReadingArgs,
  },
  /// Evaluate readings and record them with a plan and recommendation
  Log {
    #[command(flatten)]
    readings: ReadingArgs,
    /// Planned workout
    #[arg(long)]
    plan: String,
    /// Recommendation text (only a preview is stored)
    #[arg(long, default_value = "")]
    recommendation: String,
    /// Mark the workout as already completed
    #[arg(long)]
    completed: bool,
  },
  /// Run a full coaching session: evaluate, recommend, and record
  Coach {
    #[command(flatten)]
    readings: ReadingArgs,
    /// Planned workout
    #[arg(long)]
    plan: String,
    /// Mark the workout as already completed
    #[arg(long)]
    completed: bool,
  },
  /// List recorded entries
  History {
    #[command(flatten)]
    user: UserArgs,
    /// Only the most recent N entries
    #[arg(long)]
    limit: Option<usize>,
    /// Only entries from the last N days
    #[arg(long)]
    days: Option<u32>,
  },
  /// Mark a recorded workout as completed (or not, with --undo)
  Complete {
    #[command(flatten)]
    user: UserArgs,
    #[arg(long)]
    entry_id: i64,
    #[arg(long)]
    undo: bool,
  },
  /// Completion statistics
  Stats {
    #[command(flatten)]
    user: UserArgs,
  },
  /// Averages, trend directions and insights over a window
  Trends {
    #[command(flatten)]
    user: UserArgs,
    /// Window in days (defaults to AUDITOR_TREND_DAYS or 30)
    #[arg(long)]
    days: Option<u32>,
  },
}

#[derive(Args, Debug, Clone)]
pub struct UserArgs {
  #[arg(long, env = "AUDITOR_USER_ID", default_value = "default")]
  pub user_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReadingArgs {
  #[command(flatten)]
  pub user: UserArgs,
  /// Hours slept last night
  #[arg(long)]
  pub sleep: Option<f64>,
  /// Resting heart rate in bpm
  #[arg(long)]
  pub hr: Option<i64>,
  /// Recovery score 0-100 (derived from sleep and HR when omitted)
  #[arg(long)]
  pub recovery: Option<i64>,
}

impl ReadingArgs {
  pub fn snapshot(&self) -> BiometricSnapshot {
    let mut snapshot = BiometricSnapshot::from_readings(self.user.user_id.clone(), self.sleep, self.hr);
    if let Some(recovery) = self.recovery {
      snapshot.recovery_score = recovery;
    }
    snapshot
  }
}

/// ---------------------------------------------------------------------------
/// Dispatch
/// ---------------------------------------------------------------------------

/// Run one CLI command and return its JSON payload
pub async fn execute(cli: Cli) -> Result<Value, String> {
  let mut config = AuditorConfig::from_env().map_err(|e| e.to_string())?;
  if let Some(path) = cli.history_file {
    config.history_file = path;
  }

  // Evaluation is pure; only the other commands open the store
  let open_state = || {
    AppState::initialize(config.clone())
      .map_err(|e| format!("Failed to open history store: {}", e))
  };

  match cli.command {
    Commands::Evaluate { readings } => to_json(analysis::evaluate_snapshot(readings.snapshot())),
    Commands::Log {
      readings,
      plan,
      recommendation,
      completed,
    } => to_json(history::log_entry(
      &open_state()?,
      readings.snapshot(),
      plan,
      recommendation,
      completed,
    )?),
    Commands::Coach {
      readings,
      plan,
      completed,
    } => to_json(coach::run_coach(&open_state()?, readings.snapshot(), plan, completed).await?),
    Commands::History { user, limit, days } => {
      to_json(history::get_history(&open_state()?, &user.user_id, limit, days))
    }
    Commands::Complete {
      user,
      entry_id,
      undo,
    } => to_json(history::set_workout_completion(
      &open_state()?,
      &user.user_id,
      entry_id,
      !undo,
    )?),
    Commands::Stats { user } => to_json(history::get_stats(&open_state()?, &user.user_id)),
    Commands::Trends { user, days } => {
      to_json(analysis::get_trends(&open_state()?, &user.user_id, days))
    }
  }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, String> {
  serde_json::to_value(value).map_err(|e| format!("Failed to serialize output: {}", e))
}
