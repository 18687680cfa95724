//! Logging setup: colored stderr plus a JSON rolling log file.

use anyhow::{Result, anyhow};
use std::ffi::OsStr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber.
///
/// stderr is filtered by `RUST_LOG` (default `info`), the daily-rolled JSON
/// file at `log_file_path` by `RUST_LOG_JSON` (default `debug`). Keep the
/// returned guard alive for the life of the process or buffered file output
/// is lost.
pub fn init(log_file_path: &str) -> Result<WorkerGuard> {
    let path = Path::new(log_file_path);
    let log_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = path.file_name().unwrap_or(OsStr::new("canvas_grades.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info")?);

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug")?);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn env_filter(var: &str, default_directive: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::from_env(var).add_directive(default_directive.parse()?))
}
