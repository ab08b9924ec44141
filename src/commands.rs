//! Command dispatch

use std::path::{Path, PathBuf};

use fprobe_core::prelude::*;
use fprobe_core::{NativeControlTree, WindowTarget};
use fprobe_device::{discover_endpoint, window_process, Adb};
use fprobe_driver::{is_flutter_view, ControlManager, VmServiceConnector};

use crate::cli::{Cli, Command};
use crate::config::{load_settings, Settings};
use crate::output::ProbeOutput;

/// Run `cli` and print its output.
pub async fn run(cli: Cli) -> Result<()> {
    execute(cli).await?.emit()
}

/// Run `cli` and return its output without printing it.
pub async fn execute(cli: Cli) -> Result<ProbeOutput> {
    let settings = resolve_settings(&cli)?;
    debug!("Running {:?} with {:?}", cli.command, settings);

    match cli.command {
        Command::Discover => {
            let adb = settings.adb();
            let address = discover_endpoint(&adb, &adb, settings.discovery_options()).await?;
            Ok(ProbeOutput::endpoint(&address))
        }
        Command::WindowProcess { identifier } => {
            let adb = settings.adb();
            let process = window_process(&adb, &adb, &WindowTarget::from(identifier.as_str())).await?;
            Ok(ProbeOutput::window_process(identifier, process))
        }
        Command::Tree { group } => {
            let tree = manager(&settings).control_tree(&group).await?;
            info!("Fetched widget tree with {} nodes", tree.node_count());
            Ok(ProbeOutput::control_tree(group, tree))
        }
        Command::Find { locator } => {
            let control = manager(&settings).find_control(&locator).await?;
            Ok(ProbeOutput::control(locator, control))
        }
        Command::IsFlutterView { file } => {
            let tree = read_native_tree(&file)?;
            Ok(ProbeOutput::flutter_view(file, is_flutter_view(&tree)))
        }
    }
}

/// Advice attached to a failed command's report.
///
/// Recoverable errors come from an app that is still starting or was just
/// restarted; fatal ones need a different setup or arguments first.
pub fn retry_hint(error: &Error) -> Option<&'static str> {
    if error.is_recoverable() {
        Some("The app may still be starting or was restarted; run the command again")
    } else if error.is_fatal() {
        Some("Running the command again will not help until the setup or arguments change")
    } else {
        None
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let base = match &cli.global.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let mut settings = load_settings(&base);
    settings.apply_args(&cli.global);
    settings.validate()?;
    Ok(settings)
}

fn manager(settings: &Settings) -> ControlManager<Adb, VmServiceConnector> {
    ControlManager::new(settings.adb(), VmServiceConnector)
        .with_discovery_options(settings.discovery_options())
}

/// Load a native control tree dumped as JSON.
fn read_native_tree(path: &Path) -> Result<NativeControlTree> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tree: NativeControlTree = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(tree)
}
