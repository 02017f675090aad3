// Logging - tracing subscriber for suite runs
//
// Console output plus one log file per run under `Settings::log_dir`.
// Components do not hold a logger; they emit events under the span the
// fixture hands them.

use crate::error::Result;
use crate::settings::Settings;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static RUN_LOG: OnceLock<PathBuf> = OnceLock::new();

/// File name for a run started at `started`
pub fn run_log_name(started: chrono::DateTime<chrono::Local>) -> String {
    format!("test_run_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Installs the process-wide subscriber and returns the run's log file.
///
/// Only the first call installs anything; later calls return the same path.
/// Returns `None` when another subscriber (a test harness, an embedding
/// binary) already owns the process. The filter comes from `RUST_LOG`,
/// defaulting to `info`.
pub fn init(settings: &Settings) -> Result<Option<PathBuf>> {
    if let Some(path) = RUN_LOG.get() {
        return Ok(Some(path.clone()));
    }
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    std::fs::create_dir_all(&settings.log_dir)?;
    let path = settings.log_dir.join(run_log_name(chrono::Local::now()));
    let file = std::fs::File::create(&path)?;

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init();

    if installed.is_err() {
        // Lost the race against another installer
        let _ = std::fs::remove_file(&path);
        return Ok(None);
    }

    tracing::info!(log_file = %path.display(), "Logging initialized");
    Ok(Some(RUN_LOG.get_or_init(|| path).clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_log_name_format() {
        let started = chrono::Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .unwrap();
        assert_eq!(run_log_name(started), "test_run_20240309_070501.log");
    }
}
