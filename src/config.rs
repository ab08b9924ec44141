//! Settings loaded from `.fprobe/config.toml`
//!
//! ```toml
//! [device]
//! adb_path = "adb"
//! serial = "emulator-5554"
//!
//! [discovery]
//! timeout_secs = 60
//! poll_interval_ms = 1000
//! ```
//!
//! A missing or unreadable file yields defaults. Command-line flags override
//! file values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fprobe_core::prelude::*;
use fprobe_device::{Adb, DiscoveryOptions, DEFAULT_ADB_PROGRAM};

use crate::cli::GlobalArgs;

/// Settings directory, relative to the working directory
pub const FPROBE_DIR: &str = ".fprobe";

pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub device: DeviceSettings,
    pub discovery: DiscoverySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Program used for every adb call
    pub adb_path: String,

    /// Device to target when several are attached
    pub serial: Option<String>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            adb_path: DEFAULT_ADB_PROGRAM.to_string(),
            serial: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        let defaults = DiscoveryOptions::default();
        Self {
            timeout_secs: defaults.deadline.as_secs(),
            poll_interval_ms: defaults.poll_interval.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Overlay command-line flags.
    pub fn apply_args(&mut self, args: &GlobalArgs) {
        if let Some(adb) = &args.adb {
            self.device.adb_path = adb.clone();
        }
        if let Some(serial) = &args.serial {
            self.device.serial = Some(serial.clone());
        }
        if let Some(timeout) = args.timeout {
            self.discovery.timeout_secs = timeout;
        }
        if let Some(interval) = args.interval {
            self.discovery.poll_interval_ms = interval;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.device.adb_path.trim().is_empty() {
            return Err(Error::config("device.adb_path must not be empty"));
        }
        if self.discovery.poll_interval_ms == 0 {
            return Err(Error::config(
                "discovery.poll_interval_ms must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn adb(&self) -> Adb {
        let adb = Adb::new(self.device.adb_path.clone());
        match &self.device.serial {
            Some(serial) => adb.with_serial(serial.clone()),
            None => adb,
        }
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions::default()
            .with_deadline(Duration::from_secs(self.discovery.timeout_secs))
            .with_poll_interval(Duration::from_millis(self.discovery.poll_interval_ms))
    }
}

/// Load settings from `<base>/.fprobe/config.toml`.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(base: &Path) -> Settings {
    let config_path = base.join(FPROBE_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}
