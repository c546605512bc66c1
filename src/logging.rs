//! Tracing subscriber setup.
//!
//! `RUST_LOG` directives win over the configured level, which only sets the
//! default for targets `RUST_LOG` does not mention.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{Result, TokengateError};

fn level_filter(level: &str) -> LevelFilter {
    match level.trim() {
        "" => LevelFilter::INFO,
        l if l.eq_ignore_ascii_case("warning") => LevelFilter::WARN,
        l => LevelFilter::from_str(l).unwrap_or(LevelFilter::INFO),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy()
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber: stdout, plus `config.file` when set.
///
/// Fails if the log file cannot be opened or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file_layer = match config.file.as_deref() {
        Some(path) => {
            let file = Arc::new(open_log_file(Path::new(path))?);
            Some(fmt::layer().with_writer(file).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| TokengateError::Config(format!("cannot install logger: {e}")))
}

/// Install a stdout-only subscriber. Does nothing if one is already installed.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer())
        .try_init();
}
