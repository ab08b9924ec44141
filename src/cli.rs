//! Command-line interface definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// flutter-probe - Locate a Flutter app's VM Service and map windows to processes
#[derive(Parser, Debug)]
#[command(name = "fprobe", version)]
#[command(about = "Locate a Flutter app's VM Service on Android and map windows to processes", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command; each overrides `.fprobe/config.toml`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Device serial, as listed by `adb devices`
    #[arg(long, short = 's', global = true)]
    pub serial: Option<String>,

    /// Path to the adb binary
    #[arg(long, global = true, value_name = "PATH")]
    pub adb: Option<String>,

    /// Seconds to wait for the VM Service announcement
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Milliseconds between device log polls
    #[arg(long, global = true, value_name = "MS")]
    pub interval: Option<u64>,

    /// Directory holding `.fprobe/config.toml` (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Find the VM Service WebSocket address and forward its port
    Discover,

    /// Print the process that owns a window
    WindowProcess {
        /// Window hashcode, title, or `StatusBar`
        #[arg(value_name = "ID")]
        identifier: String,
    },

    /// Dump the Flutter widget tree
    Tree {
        /// Inspector object group for the returned references
        #[arg(long, default_value = "")]
        group: String,
    },

    /// Find exactly one control, e.g. `Type=Text && Description~=Submit`
    Find {
        #[arg(value_name = "LOCATOR")]
        locator: String,
    },

    /// Check a native control tree JSON file for a Flutter root view
    IsFlutterView {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
