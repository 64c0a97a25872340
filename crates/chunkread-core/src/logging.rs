//! File logging. The terminal UI owns stdout/stderr, so trace output goes
//! to a daily rolling file instead.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CHUNKREAD_LOG";

pub fn log_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("chunkread").join("logs"))
}

/// `CHUNKREAD_LOG` wins over the configured level; `info` otherwise.
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    let from_env = std::env::var(LOG_ENV).ok();
    resolve_filter(from_env.as_deref(), configured)
}

/// The first of `from_env`, `configured` that parses, else `info`. Blank
/// values count as unset.
fn resolve_filter(from_env: Option<&str>, configured: Option<&str>) -> EnvFilter {
    [from_env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init(configured_level: Option<&str>) -> Result<WorkerGuard> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::daily(&dir, "chunkread.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured_level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    Ok(guard)
}
