use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use homework_bot::logger::{self, DEFAULT_LOG_FILE};
use homework_core::{Config, ThreadSleeper};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let log_file = env::var("LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE));
    let _guard = logger::init_logging(&log_file)?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "required configuration is missing, shutting down");
            return Err(err).context("invalid configuration");
        }
    };
    tracing::info!(
        endpoint = %config.endpoint,
        chat_id = %config.chat_id,
        interval_secs = config.retry_interval.as_secs(),
        "starting homework bot"
    );

    let cursor = chrono::Utc::now().timestamp();
    let mut poller = homework_bot::build_poller(&config, cursor);
    poller.run(&mut ThreadSleeper)
}
