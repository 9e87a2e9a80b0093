//! Tracing subscriber setup.
//!
//! Logs always go to the console. When a log directory is configured, a second
//! plain-text layer appends to `<dir>/log-<yy.MM.dd_HH.mm>.log`.

use crate::errors::{Error, Result};
use chrono::NaiveDateTime;
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// File name for a log file opened at `started_at`.
#[must_use]
pub fn log_file_name(started_at: NaiveDateTime) -> String {
    format!("log-{}.log", started_at.format("%y.%m.%d_%H.%M"))
}

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Returns the path of
/// the log file when file logging is enabled.
pub fn init_tracing(log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, file_path) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(log_file_name(chrono::Local::now().naive_local()));
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))?;

    Ok(file_path)
}
