//! # fprobe-device - Android Device Access
//!
//! Everything that needs the device: reading its log, forwarding ports and
//! listing windows and activities. On top of that sit the two device-side
//! operations of flutter-probe.
//!
//! Depends on [`fprobe_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Collaborators
//! - [`LogSource`], [`PortForwarder`], [`WindowProvider`], [`ActivityProvider`]
//! - [`Adb`] - Implements all four by shelling out to `adb`
//!
//! ### Endpoint Discovery
//! - [`discover_endpoint()`] - Poll the log for the VM Service URL and forward its port
//! - [`DiscoveryOptions`] - Deadline and poll interval
//!
//! ### Window Resolution
//! - [`resolve_process()`] - Map a window to its owning process using fetched lists
//! - [`window_process()`] - Same, fetching the lists from the device

pub mod adb;
pub mod discovery;
pub mod dumpsys;
pub mod source;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod window;

pub use adb::{Adb, DEFAULT_ADB_PROGRAM};
pub use discovery::{
    discover_endpoint, latest_debug_url, DiscoveryOptions, DEFAULT_DISCOVERY_TIMEOUT,
    DEFAULT_POLL_INTERVAL,
};
pub use source::{
    ActivityProvider, LocalActivityProvider, LocalLogSource, LocalPortForwarder,
    LocalWindowProvider, LogSource, PortForwarder, WindowProvider,
};
pub use window::{resolve_process, window_process};
