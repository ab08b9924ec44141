//! Application error types with rich context

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Device/adb Errors
    // ─────────────────────────────────────────────────────────────
    #[error("adb not found at '{program}'. Install Android platform-tools or set device.adb_path.")]
    AdbNotFound { program: String },

    #[error("Device process error: {message}")]
    Process { message: String },

    // ─────────────────────────────────────────────────────────────
    // Endpoint Discovery Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No Flutter debug URL found in the device log within {deadline:?}")]
    DiscoveryTimeout { deadline: Duration },

    #[error("Malformed debug URL '{url}': {reason}")]
    MalformedDebugUrl { url: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Window Resolution Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Window not found: {identifier}")]
    WindowNotFound { identifier: String },

    // ─────────────────────────────────────────────────────────────
    // Control Query Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No control matches locator: {locator}")]
    ControlNotFound { locator: String },

    #[error("Control is not unique: {count} controls match locator {locator}")]
    AmbiguousControl { locator: String, count: usize },

    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("Not implemented: {operation}")]
    NotImplemented { operation: String },

    // ─────────────────────────────────────────────────────────────
    // VM Service Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to connect to VM Service at {address}: {message}")]
    Connection { address: String, message: String },

    #[error("VM Service protocol error: {message}")]
    Protocol { message: String },

    #[error("VM Service error: {0}")]
    VmService(String),

    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn discovery_timeout(deadline: Duration) -> Self {
        Self::DiscoveryTimeout { deadline }
    }

    pub fn malformed_debug_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDebugUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn window_not_found(identifier: impl Into<String>) -> Self {
        Self::WindowNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn control_not_found(locator: impl Into<String>) -> Self {
        Self::ControlNotFound {
            locator: locator.into(),
        }
    }

    pub fn ambiguous_control(locator: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousControl {
            locator: locator.into(),
            count,
        }
    }

    pub fn invalid_locator(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocator {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    pub fn connection(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            address: address.into(),
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a [`Error::VmService`] error with a message.
    pub fn vm_service(msg: impl Into<String>) -> Self {
        Self::VmService(msg.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors describe a transient device or app state; retrying
    /// the same call later (e.g. after the app finishes launching) may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DiscoveryTimeout { .. }
                | Error::Connection { .. }
                | Error::Protocol { .. }
                | Error::VmService(_)
                | Error::ChannelClosed
        )
    }

    /// Check if this error should abort the command outright
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::AdbNotFound { .. }
                | Error::InvalidLocator { .. }
                | Error::NotImplemented { .. }
                | Error::Config { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::window_not_found("ab12cd");
        assert_eq!(err.to_string(), "Window not found: ab12cd");

        let err = Error::ambiguous_control("Type=Text", 3);
        assert!(err.to_string().contains("3 controls"));
        assert!(err.to_string().contains("Type=Text"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_discovery_timeout_mentions_deadline() {
        let err = Error::discovery_timeout(Duration::from_secs(60));
        assert!(err.to_string().contains("60s"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::AdbNotFound {
            program: "adb".to_string()
        }
        .is_fatal());
        assert!(Error::not_implemented("classify").is_fatal());
        assert!(!Error::window_not_found("x").is_fatal());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::vm_service("connection lost").is_recoverable());
        assert!(Error::ChannelClosed.is_recoverable());
        assert!(!Error::control_not_found("Type=Text").is_recoverable());
    }

    #[test]
    fn test_errors_carry_offending_input() {
        assert!(Error::control_not_found("Description=OK")
            .to_string()
            .contains("Description=OK"));
        assert!(Error::malformed_debug_url("http://host/", "missing port")
            .to_string()
            .contains("http://host/"));
        assert!(Error::connection("ws://127.0.0.1:1/ws", "refused")
            .to_string()
            .contains("ws://127.0.0.1:1/ws"));
    }

    #[test]
    fn test_context_preserves_error_kind() {
        let res: std::result::Result<(), Error> = Err(Error::ChannelClosed);
        let res = res.context("sending request");
        assert!(matches!(res, Err(Error::ChannelClosed)));
    }
}
