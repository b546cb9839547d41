//! Environment-driven configuration

use std::env;
use std::path::PathBuf;

use crate::analysis::DEFAULT_TREND_DAYS;

const DEFAULT_HISTORY_FILE: &str = "data/biometric_history.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditorConfig {
  /// JSON document holding every user's history
  pub history_file: PathBuf,
  /// Window used by trend reports when none is requested
  pub trend_days: u32,
}

impl Default for AuditorConfig {
  fn default() -> Self {
    Self {
      history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
      trend_days: DEFAULT_TREND_DAYS,
    }
  }
}

impl AuditorConfig {
  /// Read `AUDITOR_HISTORY_FILE` and `AUDITOR_TREND_DAYS`, falling back to defaults
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let history_file = env::var("AUDITOR_HISTORY_FILE")
      .ok()
      .filter(|v| !v.trim().is_empty())
      .map(PathBuf::from)
      .unwrap_or(defaults.history_file);

    let trend_days = match env::var("AUDITOR_TREND_DAYS") {
      Ok(raw) => parse_days(&raw).ok_or_else(|| ConfigError::Invalid {
        key: "AUDITOR_TREND_DAYS".into(),
        value: raw,
      })?,
      Err(_) => defaults.trend_days,
    };

    Ok(Self {
      history_file,
      trend_days,
    })
  }
}

fn parse_days(raw: &str) -> Option<u32> {
  raw.trim().parse::<u32>().ok().filter(|d| *d > 0)
}
