//! Device collaborators
//!
//! Endpoint discovery and window resolution only see the device through these
//! traits. [`crate::Adb`] implements all of them; tests substitute in-memory
//! fakes.

use fprobe_core::prelude::*;
use fprobe_core::{Activity, Window};

/// Snapshot access to the device log
#[trait_variant::make(LogSource: Send)]
pub trait LocalLogSource {
    /// Read every line currently in the log buffer.
    ///
    /// This is a snapshot, not a subscription: calling it again returns the
    /// earlier lines too. When `clear_buffer` is set the buffer is emptied
    /// after reading.
    async fn log_lines(&self, clear_buffer: bool) -> Result<Vec<Vec<u8>>>;
}

/// Device-to-host port tunnel
#[trait_variant::make(PortForwarder: Send)]
pub trait LocalPortForwarder {
    /// Expose device port `remote_port` as host port `local_port`.
    ///
    /// Forwarding a port that is already forwarded must succeed.
    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<()>;
}

/// Window manager enumeration
#[trait_variant::make(WindowProvider: Send)]
pub trait LocalWindowProvider {
    /// All windows, in window manager order.
    async fn list_windows(&self) -> Result<Vec<Window>>;
}

/// Activity manager enumeration
#[trait_variant::make(ActivityProvider: Send)]
pub trait LocalActivityProvider {
    /// All running activities.
    async fn list_activities(&self) -> Result<Vec<Activity>>;
}
