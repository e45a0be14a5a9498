//! Logging setup
//!
//! The terminal UI owns stdout and stderr, so `show` logs to a file through a
//! non-blocking writer. Headless commands log to stderr and keep stdout for
//! their output. Either way `RUST_LOG` overrides the default filter.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "folio=info,folio_core=info,folio_engine=info,folio_tui=info";
const LOG_FILE_NAME: &str = "folio.log";

pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Keeps the file writer flushing. Hold it until the program exits.
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

pub fn init(target: LogTarget) -> TelemetryGuard {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            TelemetryGuard { _guard: None }
        }
        LogTarget::File(path) => {
            let (dir, name) = split_log_path(&path);
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .init();
            TelemetryGuard { _guard: Some(guard) }
        }
    }
}

/// Split a log path into the directory and file name the appender wants.
/// A bare file name logs into the current directory.
fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_absolute_path() {
        let (dir, name) = split_log_path(Path::new("/var/log/folio/run.log"));
        assert_eq!(dir, PathBuf::from("/var/log/folio"));
        assert_eq!(name, PathBuf::from("run.log"));
    }

    #[test]
    fn split_bare_name_uses_cwd() {
        let (dir, name) = split_log_path(Path::new("run.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("run.log"));
    }

    #[test]
    fn split_directory_only_falls_back_to_default_name() {
        let (_, name) = split_log_path(Path::new("/"));
        assert_eq!(name, PathBuf::from("folio.log"));
    }

    #[test]
    fn default_log_file_lives_in_temp_dir() {
        assert!(default_log_file().starts_with(std::env::temp_dir()));
        assert!(default_log_file().ends_with("folio.log"));
    }
}
