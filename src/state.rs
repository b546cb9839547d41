use std::sync::Arc;

use crate::config::AuditorConfig;
use crate::history::{HistoryError, HistoryStore};

/// Application state shared by every command handler
pub struct AppState {
  pub store: Arc<HistoryStore>,
  pub config: AuditorConfig,
}

impl AppState {
  /// Open the history store named by the configuration
  pub fn initialize(config: AuditorConfig) -> Result<Self, HistoryError> {
    let store = HistoryStore::open(&config.history_file)?;
    Ok(Self {
      store: Arc::new(store),
      config,
    })
  }
}
