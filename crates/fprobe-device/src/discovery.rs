//! VM Service endpoint discovery
//!
//! A Flutter app announces its VM Service on the device log at startup. The
//! port is assigned dynamically, so the only way to find it is to read the log.
//! [`discover_endpoint`] polls log snapshots until an announcement shows up,
//! forwards the port to the host and returns the WebSocket address.
//!
//! Each poll re-reads the whole buffer and only the *last* announcement is
//! used: an app that was relaunched leaves stale announcements behind, and the
//! newest listener is the live one.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use fprobe_core::prelude::*;
use fprobe_core::{DebugUrl, SocketAddress};

use crate::source::{LogSource, PortForwarder};

/// How long to wait for the announcement by default
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between two log snapshots by default
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Timing of a discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Give up once this much time has passed. The last poll may overrun it
    /// by up to one `poll_interval`.
    pub deadline: Duration,
    pub poll_interval: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DISCOVERY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl DiscoveryOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Return the last well-formed announcement in a log snapshot.
///
/// Lines are decoded lossily. Announcements whose URL cannot be parsed are
/// logged and skipped so they never reach port forwarding.
pub fn latest_debug_url(lines: &[Vec<u8>]) -> Option<DebugUrl> {
    let mut found = Vec::new();

    for line in lines {
        let text = String::from_utf8_lossy(line);
        match DebugUrl::from_log_line(&text) {
            Some(Ok(url)) => found.push(url),
            Some(Err(e)) => warn!("Skipping unusable VM Service announcement: {}", e),
            None => {}
        }
    }

    found.pop()
}

/// Poll the device log for the VM Service announcement and forward its port.
///
/// Returns as soon as a snapshot contains an announcement; the host port is
/// the same as the device port. Nothing is cached: every call polls again and
/// re-forwards.
///
/// # Errors
///
/// - [`Error::DiscoveryTimeout`] if no announcement appeared before the deadline.
/// - Any error from reading the log or forwarding the port, unchanged.
pub async fn discover_endpoint<S, F>(
    source: &S,
    forwarder: &F,
    options: DiscoveryOptions,
) -> Result<SocketAddress>
where
    S: LogSource,
    F: PortForwarder,
{
    let start = Instant::now();
    let mut polls: u32 = 0;

    debug!(
        "Waiting up to {:?} for the VM Service announcement (poll every {:?})",
        options.deadline, options.poll_interval
    );

    while start.elapsed() < options.deadline {
        polls += 1;
        let lines = source.log_lines(false).await?;
        trace!("Poll {}: scanning {} log lines", polls, lines.len());

        if let Some(url) = latest_debug_url(&lines) {
            debug!("Found {} after {} poll(s)", url.raw, polls);
            forwarder.forward(url.port, url.port).await?;

            let address = url.socket_address();
            info!("VM Service endpoint: {}", address);
            return Ok(address);
        }

        sleep(options.poll_interval).await;
    }

    warn!(
        "No VM Service announcement after {} poll(s) in {:?}",
        polls,
        start.elapsed()
    );
    Err(Error::discovery_timeout(options.deadline))
}
