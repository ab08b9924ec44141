//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Default filter when `FPROBE_LOG` is unset.
const DEFAULT_FILTER: &str = "flutter_probe=info,fprobe_device=info,fprobe_driver=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/flutter-probe/logs/` so that stdout
/// stays reserved for command output.
/// Log level is controlled by `FPROBE_LOG` environment variable.
///
/// # Examples
/// ```bash
/// FPROBE_LOG=debug fprobe discover
/// FPROBE_LOG=fprobe_device=trace fprobe window-process StatusBar
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "fprobe.log");

    let env_filter =
        EnvFilter::try_from_env("FPROBE_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("flutter-probe starting, log directory: {}", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("flutter-probe").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join("fprobe.log"))
}
