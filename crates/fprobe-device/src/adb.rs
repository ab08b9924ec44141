//! Android Debug Bridge backend
//!
//! [`Adb`] shells out to the `adb` binary for every collaborator operation.
//! Each call is a fresh process; nothing is kept between calls.

use std::io::ErrorKind;

use tokio::process::Command;

use fprobe_core::prelude::*;
use fprobe_core::{Activity, Window};

use crate::dumpsys::{parse_activities, parse_windows};
use crate::source::{ActivityProvider, LogSource, PortForwarder, WindowProvider};

/// Default program name, resolved through `PATH`
pub const DEFAULT_ADB_PROGRAM: &str = "adb";

/// A device reached through `adb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adb {
    program: String,
    serial: Option<String>,
}

impl Default for Adb {
    fn default() -> Self {
        Self::new(DEFAULT_ADB_PROGRAM)
    }
}

impl Adb {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            serial: None,
        }
    }

    /// Target a specific device (`adb -s <serial>`); needed when several are attached.
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Full argument list for one invocation, including the device selector.
    fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            full.push("-s");
            full.push(serial.as_str());
        }
        full.extend_from_slice(args);
        full
    }

    /// Run `adb <args>` and return its stdout.
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let args = self.args(args);
        trace!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::AdbNotFound {
                    program: self.program.clone(),
                },
                _ => Error::process(format!("Failed to run {}: {}", self.program, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::process(format!(
                "{} {} failed ({}): {}",
                self.program,
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    async fn run_text(&self, args: &[&str]) -> Result<String> {
        let stdout = self.run(args).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Split raw logcat output into lines, dropping `\r` and the trailing empty line.
fn split_lines(stdout: &[u8]) -> Vec<Vec<u8>> {
    stdout
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(<[u8]>::to_vec)
        .collect()
}

impl LogSource for Adb {
    async fn log_lines(&self, clear_buffer: bool) -> Result<Vec<Vec<u8>>> {
        let stdout = self.run(&["logcat", "-d"]).await?;
        let lines = split_lines(&stdout);

        if clear_buffer {
            self.run(&["logcat", "-c"]).await?;
        }

        Ok(lines)
    }
}

impl PortForwarder for Adb {
    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<()> {
        let local = format!("tcp:{local_port}");
        let remote = format!("tcp:{remote_port}");
        self.run(&["forward", local.as_str(), remote.as_str()]).await?;
        debug!("Forwarded host {} to device {}", local, remote);
        Ok(())
    }
}

impl WindowProvider for Adb {
    async fn list_windows(&self) -> Result<Vec<Window>> {
        let output = self.run_text(&["shell", "dumpsys", "window", "windows"]).await?;
        Ok(parse_windows(&output))
    }
}

impl ActivityProvider for Adb {
    async fn list_activities(&self) -> Result<Vec<Activity>> {
        let output = self
            .run_text(&["shell", "dumpsys", "activity", "activities"])
            .await?;
        Ok(parse_activities(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_serial() {
        let adb = Adb::default();
        assert_eq!(adb.args(&["logcat", "-d"]), vec!["logcat", "-d"]);
        assert_eq!(adb.program(), "adb");
    }

    #[test]
    fn test_args_with_serial() {
        let adb = Adb::new("/opt/android/platform-tools/adb").with_serial("emulator-5554");
        assert_eq!(
            adb.args(&["forward", "tcp:1", "tcp:1"]),
            vec!["-s", "emulator-5554", "forward", "tcp:1", "tcp:1"]
        );
        assert_eq!(adb.serial(), Some("emulator-5554"));
    }

    #[test]
    fn test_split_lines() {
        let stdout = b"first\r\nsecond\n\nthird\n";
        assert_eq!(
            split_lines(stdout),
            vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]
        );
        assert!(split_lines(b"").is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_adb_not_found() {
        let adb = Adb::new("/nonexistent/fprobe-test/adb");
        let err = adb.log_lines(false).await.unwrap_err();
        assert!(matches!(err, Error::AdbNotFound { ref program } if program.contains("fprobe-test")));
        assert!(err.is_fatal());
    }
}
