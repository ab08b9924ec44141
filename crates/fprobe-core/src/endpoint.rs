//! # Debug Endpoint Types
//!
//! A Flutter app started in debug or profile mode prints the address of its
//! Dart VM Service to the device log:
//!
//! ```text
//! I/flutter ( 4821): Observatory listening on http://127.0.0.1:37915/xT3gWq0aL9c=/
//! ```
//!
//! [`DebugUrl`] is the parsed form of that URL and [`SocketAddress`] is the
//! WebSocket address a driver connects to once the port has been forwarded.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// Pattern for the VM Service announcement line. Case-sensitive.
static DEBUG_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Observatory listening on ((http|//)[a-zA-Z0-9:/=_\-.\[\]]+)")
        .expect("Invalid debug URL regex")
});

/// Suffix appended to the URL path to reach the WebSocket endpoint.
const WS_PATH_SUFFIX: &str = "ws";

// ============================================================================
// DebugUrl
// ============================================================================

/// A VM Service URL captured from the device log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugUrl {
    /// The text exactly as captured by the pattern
    pub raw: String,
    pub scheme: String,
    /// Host as printed, IPv6 hosts keep their brackets
    pub host: String,
    pub port: u16,
    /// Path without the leading `/`, usually the auth code plus a trailing `/`
    pub path: String,
}

impl DebugUrl {
    /// Return the URL text of the first announcement in `line`, if any.
    pub fn find(line: &str) -> Option<&str> {
        DEBUG_URL_PATTERN
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Parse a captured URL into its parts.
    ///
    /// Scheme-relative URLs (`//host:port/path`) are accepted and treated as
    /// `http`. Host and path are kept exactly as printed; the URL parser only
    /// validates the text and the port. A URL without an explicit port is
    /// rejected since there is nothing to forward.
    pub fn parse(raw: &str) -> Result<Self> {
        let (scheme, rest) = match raw.split_once("://") {
            Some(parts) => parts,
            None => raw
                .strip_prefix("//")
                .map(|rest| ("http", rest))
                .ok_or_else(|| Error::malformed_debug_url(raw, "missing scheme"))?,
        };

        let url = Url::parse(&format!("{scheme}://{rest}"))
            .map_err(|e| Error::malformed_debug_url(raw, e.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(Error::malformed_debug_url(raw, "missing host"));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        // IPv6 hosts keep their brackets; the port follows the last ':' after them
        let host_end = authority.rfind(']').map_or(0, |i| i + 1);
        let (host, port_text) = authority[host_end..]
            .rfind(':')
            .map(|i| (&authority[..host_end + i], &authority[host_end + i + 1..]))
            .filter(|(_, port)| !port.is_empty())
            .ok_or_else(|| Error::malformed_debug_url(raw, "missing port"))?;
        // `Url::port` hides a port equal to the scheme default (":80").
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::malformed_debug_url(raw, format!("invalid port '{port_text}'")))?;

        Ok(Self {
            raw: raw.to_string(),
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Find and parse the announcement in `line`.
    ///
    /// Returns `None` when the line has no announcement and `Some(Err(_))`
    /// when it has one that cannot be parsed.
    pub fn from_log_line(line: &str) -> Option<Result<Self>> {
        Self::find(line).map(Self::parse)
    }

    /// Derive the WebSocket address of this endpoint.
    pub fn socket_address(&self) -> SocketAddress {
        SocketAddress {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
        }
    }
}

// ============================================================================
// SocketAddress
// ============================================================================

/// WebSocket address of a VM Service: `ws://<host>:<port>/<path>ws`.
///
/// Built fresh by every discovery; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketAddress {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl SocketAddress {
    /// The address as a connectable URI string.
    pub fn to_uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ws://{}:{}/{}{}",
            self.host, self.port, self.path, WS_PATH_SUFFIX
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_in_logcat_line() {
        let line = "I/flutter ( 4821): Observatory listening on http://127.0.0.1:37915/xT3gWq0aL9c=/";
        assert_eq!(
            DebugUrl::find(line),
            Some("http://127.0.0.1:37915/xT3gWq0aL9c=/")
        );
    }

    #[test]
    fn test_find_is_case_sensitive() {
        assert!(DebugUrl::find("observatory listening on http://127.0.0.1:1/a/").is_none());
        assert!(DebugUrl::find("Observatory Listening on http://127.0.0.1:1/a/").is_none());
    }

    #[test]
    fn test_find_requires_http_or_scheme_relative() {
        assert!(DebugUrl::find("Observatory listening on ws://127.0.0.1:1/a/").is_none());
        assert_eq!(
            DebugUrl::find("Observatory listening on //127.0.0.1:1/a/"),
            Some("//127.0.0.1:1/a/")
        );
    }

    #[test]
    fn test_find_stops_at_characters_outside_the_class() {
        let line = "Observatory listening on http://127.0.0.1:9100/abc/ (pid 42)";
        assert_eq!(DebugUrl::find(line), Some("http://127.0.0.1:9100/abc/"));
    }

    #[test]
    fn test_parse_http_url() {
        let url = DebugUrl::parse("http://127.0.0.1:9100/abcd123/").unwrap();
        assert_eq!(url.scheme, "http");
        assert_eq!(url.host, "127.0.0.1");
        assert_eq!(url.port, 9100);
        assert_eq!(url.path, "abcd123/");
    }

    #[test]
    fn test_parse_scheme_relative_url() {
        let url = DebugUrl::parse("//127.0.0.1:9100/abcd123/").unwrap();
        assert_eq!(url.scheme, "http");
        assert_eq!(url.port, 9100);
        assert_eq!(url.raw, "//127.0.0.1:9100/abcd123/");
    }

    #[test]
    fn test_parse_ipv6_host() {
        let url = DebugUrl::parse("http://[::1]:40123/tok=/").unwrap();
        assert_eq!(url.host, "[::1]");
        assert_eq!(url.port, 40123);
        assert_eq!(
            url.socket_address().to_string(),
            "ws://[::1]:40123/tok=/ws"
        );
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        let err = DebugUrl::parse("http://localhost/abc/").unwrap_err();
        assert!(matches!(err, Error::MalformedDebugUrl { .. }));
    }

    #[test]
    fn test_parse_keeps_explicit_default_port() {
        let url = DebugUrl::parse("http://127.0.0.1:80/abc/").unwrap();
        assert_eq!(url.port, 80);
    }

    #[test]
    fn test_parse_keeps_host_and_path_as_printed() {
        let url = DebugUrl::parse("http://LocalHost:9100/tok=/./x/../").unwrap();
        assert_eq!(url.host, "LocalHost");
        assert_eq!(url.path, "tok=/./x/../");
        assert_eq!(
            url.socket_address().to_uri(),
            "ws://LocalHost:9100/tok=/./x/../ws"
        );

        let url = DebugUrl::parse("//127.1:9100/abc/").unwrap();
        assert_eq!(url.host, "127.1");
    }

    #[test]
    fn test_parse_rejects_empty_port() {
        assert!(DebugUrl::parse("http://127.0.0.1:/abc/").is_err());
    }

    #[test]
    fn test_parse_rejects_port_out_of_range() {
        assert!(DebugUrl::parse("http://127.0.0.1:99999/abc/").is_err());
    }

    #[test]
    fn test_socket_address_appends_ws_suffix() {
        let url = DebugUrl::parse("http://127.0.0.1:9100/abcd123/").unwrap();
        assert_eq!(
            url.socket_address().to_uri(),
            "ws://127.0.0.1:9100/abcd123/ws"
        );
    }

    #[test]
    fn test_socket_address_without_path() {
        let url = DebugUrl::parse("http://127.0.0.1:9100/").unwrap();
        assert_eq!(url.socket_address().to_string(), "ws://127.0.0.1:9100/ws");
    }

    #[test]
    fn test_from_log_line() {
        assert!(DebugUrl::from_log_line("D/AndroidRuntime: nothing here").is_none());
        let parsed = DebugUrl::from_log_line("Observatory listening on http://127.0.0.1:1234/a/")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.port, 1234);
        assert!(DebugUrl::from_log_line("Observatory listening on http://host-only/")
            .unwrap()
            .is_err());
    }
}
