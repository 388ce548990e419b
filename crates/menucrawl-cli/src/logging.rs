//! Logging setup: console on stderr plus a plain-text log file.

use crate::config::Verbosity;
use crate::error::{CliError, CliResult};
use std::fs::File;
use std::path::Path;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the level derived from `verbosity`. The log file is
/// truncated. Keep the returned guard alive until exit or buffered lines are
/// lost.
pub fn init(verbosity: Verbosity, log_file: &Path) -> CliResult<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let file = File::create(log_file).map_err(|e| {
        CliError::logging(format!("cannot open {}: {e}", log_file.display()))
    })?;
    let (file_writer, guard) = non_blocking(file);

    // time + level + message only
    let file_layer = fmt::Layer::new()
        .with_writer(file_writer)
        .with_target(false)
        .with_ansi(false);
    let console_layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false);

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))?;

    Ok(guard)
}
