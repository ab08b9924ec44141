//! JSON-RPC 2.0 protocol types for the Dart VM Service WebSocket interface.
//!
//! Only the request/response half of the protocol is modelled. Stream
//! notifications are recognised so they can be skipped, but never decoded.
//!
//! Protocol reference:
//! <https://github.com/dart-lang/sdk/blob/main/runtime/vm/service/service.md>

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request to the Dart VM Service.
#[derive(Debug, Serialize)]
pub struct VmServiceRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    pub id: String,
    /// Method name, e.g. `"getVM"` or `"ext.flutter.inspector.getRootWidgetTree"`.
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl VmServiceRequest {
    pub fn new(id: String, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response from the Dart VM Service.
#[derive(Debug, Deserialize)]
pub struct VmServiceResponse {
    /// The ID matching the original request.
    pub id: Option<String>,
    pub result: Option<Value>,
    pub error: Option<VmServiceError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
pub struct VmServiceError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

// ---------------------------------------------------------------------------
// VM / Isolate information types
// ---------------------------------------------------------------------------

/// Response body from the `getVM` RPC call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmInfo {
    pub name: String,
    /// Dart VM version string.
    pub version: String,
    pub isolates: Vec<IsolateRef>,
}

/// Lightweight reference to a Dart isolate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolateRef {
    /// Unique isolate ID (e.g. `"isolates/1234"`).
    pub id: String,
    pub name: String,
    pub number: Option<String>,
    /// Whether this is an internal VM system isolate.
    pub is_system_isolate: Option<bool>,
}

impl VmInfo {
    /// The first non-system isolate; in a Flutter app this is `main`.
    pub fn main_isolate(&self) -> Option<&IsolateRef> {
        self.isolates
            .iter()
            .find(|iso| !iso.is_system_isolate.unwrap_or(false))
    }
}

// ---------------------------------------------------------------------------
// Parsed message discriminant
// ---------------------------------------------------------------------------

/// The result of parsing a raw VM Service WebSocket text frame.
#[derive(Debug)]
pub enum VmServiceMessage {
    /// A response to a request we sent (has an `id` field).
    Response(VmServiceResponse),
    /// A notification (no `id`); carries the method name only.
    Notification(String),
    /// A message we received but could not interpret.
    Unknown(String),
}

/// Parse a raw WebSocket text message into a typed [`VmServiceMessage`].
///
/// - A top-level non-null `"id"` makes it a [`VmServiceResponse`].
/// - A `"method"` without an `"id"` makes it a notification.
/// - Anything else is [`VmServiceMessage::Unknown`].
pub fn parse_vm_message(text: &str) -> VmServiceMessage {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return VmServiceMessage::Unknown(text.to_string()),
    };

    let has_id = value.get("id").is_some_and(|v| !v.is_null());

    if has_id {
        match serde_json::from_value::<VmServiceResponse>(value) {
            Ok(response) => VmServiceMessage::Response(response),
            Err(_) => VmServiceMessage::Unknown(text.to_string()),
        }
    } else if let Some(method) = value.get("method").and_then(Value::as_str) {
        VmServiceMessage::Notification(method.to_string())
    } else {
        VmServiceMessage::Unknown(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Request tracker
// ---------------------------------------------------------------------------

/// Global monotonically-increasing counter for VM Service request IDs.
static VM_REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_vm_request_id() -> String {
    VM_REQUEST_ID_COUNTER
        .fetch_add(1, Ordering::SeqCst)
        .to_string()
}

/// Tracks in-flight VM Service requests and matches them to responses.
#[derive(Default)]
pub struct VmRequestTracker {
    pending: HashMap<String, oneshot::Sender<VmServiceResponse>>,
}

impl VmRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh request ID and register a pending slot for it.
    ///
    /// Returns `(id, receiver)` where `id` must be sent in the JSON-RPC
    /// request and `receiver` will yield the response when it arrives.
    pub fn register(&mut self) -> (String, oneshot::Receiver<VmServiceResponse>) {
        let id = next_vm_request_id();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id.clone(), tx);
        (id, rx)
    }

    /// Deliver a response to its waiting caller.
    ///
    /// Returns `false` if no request with `id` is pending.
    pub fn complete(&mut self, id: &str, response: VmServiceResponse) -> bool {
        match self.pending.remove(id) {
            Some(tx) => {
                // The receiver may have been dropped; ignore the error.
                let _ = tx.send(response);
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_vm_response() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": "1",
            "result": {
                "type": "VM",
                "name": "vm",
                "version": "3.4.0",
                "isolates": [
                    {"type": "@Isolate", "id": "isolates/9", "name": "vm-service", "isSystemIsolate": true},
                    {"type": "@Isolate", "id": "isolates/1", "name": "main", "number": "1"}
                ]
            }
        }"#;

        match parse_vm_message(json) {
            VmServiceMessage::Response(resp) => {
                assert_eq!(resp.id.as_deref(), Some("1"));
                let vm: VmInfo = serde_json::from_value(resp.result.unwrap()).unwrap();
                assert_eq!(vm.main_isolate().unwrap().id, "isolates/1");
            }
            other => panic!("Expected Response, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"jsonrpc":"2.0","id":"42","error":{"code":-32601,"message":"Method not found"}}"#;

        match parse_vm_message(json) {
            VmServiceMessage::Response(resp) => {
                let err = resp.error.expect("error should be present");
                assert_eq!(err.code, -32601);
                assert_eq!(err.message, "Method not found");
            }
            other => panic!("Expected Response, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_notification() {
        let json = r#"{"jsonrpc":"2.0","method":"streamNotify","params":{"streamId":"Isolate"}}"#;
        assert!(matches!(
            parse_vm_message(json),
            VmServiceMessage::Notification(ref m) if m == "streamNotify"
        ));
    }

    #[test]
    fn test_parse_garbage_returns_unknown() {
        assert!(matches!(parse_vm_message("not json {{{"), VmServiceMessage::Unknown(_)));
        assert!(matches!(
            parse_vm_message(r#"{"jsonrpc": "2.0"}"#),
            VmServiceMessage::Unknown(_)
        ));
    }

    #[test]
    fn test_request_serialization_skips_empty_params() {
        let request = VmServiceRequest::new("7".to_string(), "getVM", None);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"jsonrpc":"2.0","id":"7","method":"getVM"}"#);
    }

    #[test]
    fn test_main_isolate_none_when_only_system() {
        let vm = VmInfo {
            name: "vm".to_string(),
            version: "3.4.0".to_string(),
            isolates: vec![IsolateRef {
                id: "isolates/9".to_string(),
                name: "vm-service".to_string(),
                number: None,
                is_system_isolate: Some(true),
            }],
        };
        assert!(vm.main_isolate().is_none());
    }

    #[tokio::test]
    async fn test_tracker_routes_response() {
        let mut tracker = VmRequestTracker::new();
        let (id, rx) = tracker.register();
        assert_eq!(tracker.pending_count(), 1);

        let response = VmServiceResponse {
            id: Some(id.clone()),
            result: Some(serde_json::json!({"ok": true})),
            error: None,
        };
        assert!(tracker.complete(&id, response));
        assert_eq!(tracker.pending_count(), 0);
        assert!(rx.await.unwrap().result.is_some());
    }

    #[test]
    fn test_tracker_unknown_id() {
        let mut tracker = VmRequestTracker::new();
        let response = VmServiceResponse {
            id: Some("999999".to_string()),
            result: None,
            error: None,
        };
        assert!(!tracker.complete("999999", response));
    }
}
