//! Test utilities for device collaborators
//!
//! Provides an in-memory [`FakeDevice`] implementing every trait in
//! [`crate::source`], so discovery and window resolution can be tested without
//! a device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use fprobe_core::prelude::*;
use fprobe_core::{Activity, Window};

use crate::source::{ActivityProvider, LogSource, PortForwarder, WindowProvider};

/// Log snapshots returned by successive [`LogSource::log_lines`] calls.
#[derive(Debug, Clone)]
pub enum ScriptedLog {
    /// Every read returns the same lines
    Constant(Vec<Vec<u8>>),
    /// Each read returns the next snapshot; the last one repeats
    Sequence(VecDeque<Vec<Vec<u8>>>),
    /// Every read fails with a process error
    Failing,
}

impl ScriptedLog {
    pub fn constant(lines: &[&str]) -> Self {
        ScriptedLog::Constant(to_bytes(lines))
    }

    pub fn sequence(snapshots: Vec<Vec<&str>>) -> Self {
        ScriptedLog::Sequence(snapshots.iter().map(|s| to_bytes(s)).collect())
    }

    fn next_snapshot(&mut self) -> Result<Vec<Vec<u8>>> {
        match self {
            ScriptedLog::Constant(lines) => Ok(lines.clone()),
            ScriptedLog::Sequence(snapshots) => {
                let snapshot = if snapshots.len() > 1 {
                    snapshots.pop_front()
                } else {
                    snapshots.front().cloned()
                };
                Ok(snapshot.unwrap_or_default())
            }
            ScriptedLog::Failing => Err(Error::process("logcat exited with status 1")),
        }
    }
}

impl Default for ScriptedLog {
    fn default() -> Self {
        ScriptedLog::Constant(Vec::new())
    }
}

fn to_bytes(lines: &[&str]) -> Vec<Vec<u8>> {
    lines.iter().map(|l| l.as_bytes().to_vec()).collect()
}

/// In-memory device that records what was asked of it.
#[derive(Debug, Default)]
pub struct FakeDevice {
    log: Mutex<ScriptedLog>,
    log_reads: AtomicUsize,
    forwarded: Mutex<Vec<(u16, u16)>>,
    windows: Vec<Window>,
    activities: Vec<Activity>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: ScriptedLog) -> Self {
        self.log = Mutex::new(log);
        self
    }

    pub fn with_failing_log(self) -> Self {
        self.with_log(ScriptedLog::Failing)
    }

    pub fn with_windows(mut self, windows: Vec<Window>) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_activities(mut self, activities: Vec<Activity>) -> Self {
        self.activities = activities;
        self
    }

    /// Number of log snapshots taken so far
    pub fn log_reads(&self) -> usize {
        self.log_reads.load(Ordering::SeqCst)
    }

    /// Every `(local, remote)` pair passed to `forward`, in call order
    pub fn forwarded(&self) -> Vec<(u16, u16)> {
        self.forwarded
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

impl LogSource for FakeDevice {
    async fn log_lines(&self, _clear_buffer: bool) -> Result<Vec<Vec<u8>>> {
        self.log_reads.fetch_add(1, Ordering::SeqCst);
        let mut log = self
            .log
            .lock()
            .map_err(|_| Error::process("fake log poisoned"))?;
        log.next_snapshot()
    }
}

impl PortForwarder for FakeDevice {
    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<()> {
        self.forwarded
            .lock()
            .map_err(|_| Error::process("fake forwarder poisoned"))?
            .push((local_port, remote_port));
        Ok(())
    }
}

impl WindowProvider for FakeDevice {
    async fn list_windows(&self) -> Result<Vec<Window>> {
        Ok(self.windows.clone())
    }
}

impl ActivityProvider for FakeDevice {
    async fn list_activities(&self) -> Result<Vec<Activity>> {
        Ok(self.activities.clone())
    }
}
