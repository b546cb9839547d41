pub mod analysis;
pub mod coach;
pub mod commands;
pub mod compliance;
pub mod config;
pub mod history;
pub mod ingestion;
pub mod models;
pub mod state;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::Cli;

pub use analysis::{trends, TrendReport};
pub use compliance::evaluate;
pub use history::{HistoryError, HistoryStore};

pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  // Logs go to stderr; stdout carries the JSON result
  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| "biometric_auditor_lib=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
    Ok(runtime) => runtime,
    Err(e) => exit_error(&format!("Failed to start runtime: {}", e)),
  };

  match runtime.block_on(commands::execute(cli)) {
    Ok(output) => match serde_json::to_string_pretty(&output) {
      Ok(text) => println!("{}", text),
      Err(e) => exit_error(&format!("Failed to render output: {}", e)),
    },
    Err(message) => exit_error(&message),
  }
}

fn exit_error(message: &str) -> ! {
  let err = json!({
    "error": "cli_error",
    "message": message,
  });
  eprintln!("{}", err);
  std::process::exit(1);
}
