//! Tracing initialisation
//!
//! Console output goes to stderr with a level chosen by `-v` (overridable
//! with `RUST_LOG`). When `[logging] dir` is configured, a daily-rolling JSON
//! log is written there as well.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "content-quorum.log";

/// Keeps the background log writer alive; drop it last
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)))
}

pub fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<LoggingGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(build_env_filter(verbose));

    let (file_layer, worker_guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create logging directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    if let Some(dir) = log_dir {
        tracing::debug!(dir = %dir.display(), "File logging enabled");
    }
    Ok(LoggingGuard {
        _worker_guard: worker_guard,
    })
}
