//! Logging setup. The terminal belongs to the UI, so events only go to a file.
//!
//! ## Environment Variables
//!
//! 1. **`TERMFOLIO_LOG`** (highest priority). A bare level such as `debug`
//!    applies to this crate only, anything else is used as a full filter.
//! 2. **`RUST_LOG`**, used as-is.
//! 3. **Default**: `warn` globally, `info` for termfolio.
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/termfolio/logs/termfolio-<pid>.log`, overridden
//! by `--log-file <path>` or `TERMFOLIO_LOG_FILE`.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::ParseError, fmt, layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

const DEFAULT_FILTER: &str = "warn,termfolio=info";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install the log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Returned from [`init`]; dropping it flushes and stops the file writer.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

pub fn init(config: LogConfig) -> Result<LogGuard, LogError> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true)
        .with_filter(create_filter()?);

    Registry::default().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("termfolio-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("termfolio")
        .join("logs");
    (dir, filename)
}

fn create_filter() -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(filter_directives(
        env::var("TERMFOLIO_LOG").ok().as_deref(),
        env::var("RUST_LOG").ok().as_deref(),
    ))
}

fn filter_directives(termfolio_log: Option<&str>, rust_log: Option<&str>) -> String {
    if let Some(level) = termfolio_log {
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }
        return format!("warn,termfolio={level}");
    }
    rust_log.unwrap_or(DEFAULT_FILTER).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_the_crate() {
        assert_eq!(
            filter_directives(Some("debug"), Some("trace")),
            "warn,termfolio=debug"
        );
    }

    #[test]
    fn full_filters_pass_through() {
        assert_eq!(
            filter_directives(Some("termfolio::navigator=trace"), None),
            "termfolio::navigator=trace"
        );
        assert_eq!(filter_directives(None, Some("info")), "info");
        assert_eq!(filter_directives(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn log_file_override_with_extension_is_used_verbatim() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/portfolio/session.log")));
        assert_eq!(dir, PathBuf::from("/tmp/portfolio"));
        assert_eq!(name, "session.log");
    }

    #[test]
    fn log_directory_override_gets_default_name() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/portfolio-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/portfolio-logs"));
        assert!(name.starts_with("termfolio-"));
        assert!(name.ends_with(".log"));
    }
}
