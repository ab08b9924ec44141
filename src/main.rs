//! fprobe - Flutter VM Service discovery and window inspection for Android
//!
//! This is the binary entry point. All logic lives in the library.

use clap::Parser;
use color_eyre::Section;
use flutter_probe::Cli;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Logs go to a file; the command still runs without one
    if let Err(e) = fprobe_core::logging::init() {
        eprintln!("warning: file logging disabled: {e}");
    }

    let Err(error) = flutter_probe::run(cli).await else {
        return Ok(());
    };

    let hint = flutter_probe::commands::retry_hint(&error);
    let report = Err::<(), _>(error).with_note(|| {
        fprobe_core::logging::get_current_log_file()
            .map(|path| format!("Log file: {}", path.display()))
            .unwrap_or_else(|_| "Set FPROBE_LOG=debug for details".to_string())
    });

    match hint {
        Some(hint) => report.suggestion(hint),
        None => report,
    }
}
