//! JSON command output
//!
//! Every command prints exactly one JSON object to stdout, tagged with the
//! command that produced it:
//!
//! ```json
//! {"output":"endpoint","address":"ws://127.0.0.1:9100/abcd123/ws","port":9100,"timestamp":1704700001000}
//! {"output":"window_process","target":"StatusBar","process":"com.android.systemui","timestamp":1704700002000}
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use fprobe_core::prelude::*;
use fprobe_core::{ControlHandle, DiagnosticsNode, SocketAddress};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum ProbeOutput {
    /// VM Service endpoint found and forwarded
    Endpoint {
        address: String,
        port: u16,
        timestamp: i64,
    },

    /// Owning process of a window; `null` when no activity hosts it
    WindowProcess {
        target: String,
        process: Option<String>,
        timestamp: i64,
    },

    ControlTree {
        group: String,
        node_count: usize,
        tree: DiagnosticsNode,
        timestamp: i64,
    },

    Control {
        locator: String,
        control: ControlHandle,
        timestamp: i64,
    },

    FlutterView {
        file: PathBuf,
        is_flutter_view: bool,
        timestamp: i64,
    },
}

impl ProbeOutput {
    pub fn endpoint(address: &SocketAddress) -> Self {
        Self::Endpoint {
            address: address.to_uri(),
            port: address.port,
            timestamp: Self::now(),
        }
    }

    pub fn window_process(target: impl Into<String>, process: Option<String>) -> Self {
        Self::WindowProcess {
            target: target.into(),
            process,
            timestamp: Self::now(),
        }
    }

    pub fn control_tree(group: impl Into<String>, tree: DiagnosticsNode) -> Self {
        Self::ControlTree {
            group: group.into(),
            node_count: tree.node_count(),
            tree,
            timestamp: Self::now(),
        }
    }

    pub fn control(locator: impl Into<String>, control: ControlHandle) -> Self {
        Self::Control {
            locator: locator.into(),
            control,
            timestamp: Self::now(),
        }
    }

    pub fn flutter_view(file: impl Into<PathBuf>, is_flutter_view: bool) -> Self {
        Self::FlutterView {
            file: file.into(),
            is_flutter_view,
            timestamp: Self::now(),
        }
    }

    /// Write this output to stdout as one JSON line.
    pub fn emit(&self) -> Result<()> {
        let json = serde_json::to_string(self)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
        Ok(())
    }

    /// Current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn to_value(output: &ProbeOutput) -> Value {
        serde_json::to_value(output).unwrap()
    }

    #[test]
    fn test_endpoint_output() {
        let address = SocketAddress {
            host: "127.0.0.1".to_string(),
            port: 9100,
            path: "abcd123/".to_string(),
        };
        let json = to_value(&ProbeOutput::endpoint(&address));
        assert_eq!(json["output"], "endpoint");
        assert_eq!(json["address"], "ws://127.0.0.1:9100/abcd123/ws");
        assert_eq!(json["port"], 9100);
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_window_process_unknown_is_null() {
        let json = to_value(&ProbeOutput::window_process("a1b2c3d", None));
        assert_eq!(json["output"], "window_process");
        assert!(json["process"].is_null());
    }

    #[test]
    fn test_control_output_uses_camel_case_handle() {
        let control = ControlHandle {
            value_id: Some("inspector-3".to_string()),
            object_id: None,
            description: "Text(\"OK\")".to_string(),
            widget_type: "Text".to_string(),
        };
        let json = to_value(&ProbeOutput::control("Type=Text", control));
        assert_eq!(json["control"]["valueId"], "inspector-3");
        assert_eq!(json["control"]["widgetType"], "Text");
    }

    #[test]
    fn test_flutter_view_output() {
        let json = to_value(&ProbeOutput::flutter_view("controls.json", true));
        assert_eq!(json["output"], "flutter_view");
        assert_eq!(json["is_flutter_view"], true);
        assert_eq!(json["file"], "controls.json");
    }
}
