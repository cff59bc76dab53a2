//! Logging setup for the CLI.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, fmt};

/// The console filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_CONSOLE_FILTER: &str = "warn";

/// Errors from setting up logging.
#[derive(Debug, Error)]
#[error("cannot open log file {}: {source}", path.display())]
pub struct LoggerError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// An installed logger.
///
/// Events at `info` and above are appended to a file as JSON lines, and a
/// human-readable copy filtered by `RUST_LOG` goes to stderr. The logger
/// only applies to the thread that installed it, until it is shut down.
pub struct Logger {
    file: Arc<File>,
    path: PathBuf,
    _guard: DefaultGuard,
}

impl Logger {
    /// Opens `path` for appending and installs the logger on the current
    /// thread.
    pub fn install<P: AsRef<Path>>(path: P) -> Result<Self, LoggerError> {
        let path = path.as_ref().to_owned();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggerError {
                path: path.clone(),
                source,
            })?;
        let file = Arc::new(file);

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_writer(Arc::clone(&file))
                    .with_filter(LevelFilter::INFO),
            )
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_filter(console_filter),
            );
        let guard = tracing::subscriber::set_default(subscriber);
        info!(path = %path.display(), "logger installed");

        Ok(Self {
            file,
            path,
            _guard: guard,
        })
    }

    /// Returns the path of the log file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the log file and uninstalls the logger.
    pub fn shutdown(self) {
        info!("logger shutting down");
        if let Err(err) = self.file.sync_all() {
            eprintln!("failed to flush log file {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_json_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.log");

        let logger = Logger::install(&path).unwrap();
        info!(answer = 42, "tool round finished");
        debug!("too chatty for the file");
        logger.shutdown();
        info!("after shutdown");

        let log = std::fs::read_to_string(&path).unwrap();
        let events: Vec<serde_json::Value> = log
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let messages: Vec<_> = events
            .iter()
            .map(|event| event["fields"]["message"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(
            messages,
            [
                "logger installed",
                "tool round finished",
                "logger shutting down"
            ]
        );
        assert_eq!(events[1]["fields"]["answer"], 42);
        assert_eq!(events[1]["level"], "INFO");
    }

    #[test]
    fn test_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let err = Logger::install(dir.path().join("missing/agent.log"))
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("cannot open log file "));
    }
}
