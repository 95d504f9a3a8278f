use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_FILE: &str = "program.log";

/// Log to stdout and to `log_file`.
///
/// `RUST_LOG` wins over `LOG_LEVEL`; the default level is `debug`. Keep the
/// returned guard alive for as long as the process logs, dropping it flushes
/// the file writer.
pub fn init_logging(log_file: &Path) -> Result<WorkerGuard> {
    let level = env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "debug".to_string())
        .to_lowercase();
    let filter = match env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => EnvFilter::new(level),
    };

    let (writer, guard) = tracing_appender::non_blocking(file_appender(log_file)?);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

/// Open `log_file` for appending, without rotation.
fn file_appender(log_file: &Path) -> Result<RollingFileAppender> {
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .with_context(|| format!("log file path {} has no file name", log_file.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(directory)
        .with_context(|| format!("cannot open log file {}", log_file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_log_path_is_an_error() {
        let err = init_logging(Path::new("/proc/nonexistent_dir/program.log")).unwrap_err();
        assert!(err.to_string().contains("program.log"), "unexpected error: {err:#}");
    }

    #[test]
    fn path_without_file_name_is_an_error() {
        assert!(file_appender(Path::new("/")).is_err());
    }

    #[test]
    fn log_file_is_created_in_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.log");
        file_appender(&path).unwrap();
        assert!(path.exists());
    }
}
