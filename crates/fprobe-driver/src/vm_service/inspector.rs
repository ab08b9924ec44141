//! Flutter widget inspector service extensions.
//!
//! The inspector scopes every object reference it hands out (`valueId`) to an
//! *object group*. References stay valid until the group is disposed, so a
//! caller that wants to keep using handles must keep the group alive.

use std::collections::HashMap;

use serde_json::{json, Value};

use fprobe_core::prelude::*;
use fprobe_core::DiagnosticsNode;

use super::client::VmServiceClient;

/// Flutter inspector extension method names.
pub mod ext {
    /// Full widget tree (Flutter 3.22+).
    pub const GET_ROOT_WIDGET_TREE: &str = "ext.flutter.inspector.getRootWidgetTree";

    /// Summary tree, for Flutter versions without `getRootWidgetTree`.
    pub const GET_ROOT_WIDGET_SUMMARY_TREE: &str =
        "ext.flutter.inspector.getRootWidgetSummaryTree";

    /// Release every reference fetched under an object group.
    pub const DISPOSE_GROUP: &str = "ext.flutter.inspector.disposeGroup";
}

/// Group used when the caller passes an empty group name.
pub const DEFAULT_OBJECT_GROUP: &str = "fprobe";

/// JSON-RPC error code for a method the VM does not know.
const METHOD_NOT_FOUND_CODE: i32 = -32601;

/// VM Service error code for an extension that has not been registered yet.
const EXTENSION_NOT_AVAILABLE_CODE: i32 = 113;

/// Whether `error` means the extension is not registered on this isolate.
pub fn is_extension_not_available(error: &Error) -> bool {
    match error {
        Error::Protocol { message } => {
            message.contains(&format!("error {METHOD_NOT_FOUND_CODE}:"))
                || message.contains(&format!("error {EXTENSION_NOT_AVAILABLE_CODE}:"))
                || message.to_lowercase().contains("method not found")
        }
        _ => false,
    }
}

/// Group name to send: `group_name`, or [`DEFAULT_OBJECT_GROUP`] when empty.
pub fn object_group(group_name: &str) -> &str {
    if group_name.is_empty() {
        DEFAULT_OBJECT_GROUP
    } else {
        group_name
    }
}

/// Parse a [`DiagnosticsNode`] from an extension response.
///
/// Some Flutter versions wrap the node in an extra `"result"` field.
pub fn parse_diagnostics_node_response(value: &Value) -> Result<DiagnosticsNode> {
    let node_value = value.get("result").unwrap_or(value);
    serde_json::from_value(node_value.clone())
        .map_err(|e| Error::protocol(format!("failed to parse DiagnosticsNode: {e}")))
}

/// Build `params` for an extension call: `isolateId` plus string arguments.
pub(super) fn build_extension_params(
    isolate_id: &str,
    args: Option<HashMap<String, String>>,
) -> Value {
    let mut params = serde_json::Map::new();
    params.insert("isolateId".to_string(), json!(isolate_id));
    if let Some(extra) = args {
        for (k, v) in extra {
            params.insert(k, json!(v));
        }
    }
    Value::Object(params)
}

/// Fetch the root widget tree under `object_group`.
///
/// Uses `getRootWidgetTree` and falls back to `getRootWidgetSummaryTree` when
/// the newer extension is not registered. Transport errors are not retried.
pub async fn get_root_widget_tree(
    client: &VmServiceClient,
    isolate_id: &str,
    object_group: &str,
) -> Result<DiagnosticsNode> {
    let mut newer_args = HashMap::new();
    newer_args.insert("groupName".to_string(), object_group.to_string());
    newer_args.insert("isSummaryTree".to_string(), "false".to_string());
    newer_args.insert("withPreviews".to_string(), "true".to_string());

    let result = client
        .call_extension(ext::GET_ROOT_WIDGET_TREE, isolate_id, Some(newer_args))
        .await;

    match result {
        Ok(value) => parse_diagnostics_node_response(&value),
        Err(e) if is_extension_not_available(&e) => {
            debug!("getRootWidgetTree not available, falling back to getRootWidgetSummaryTree: {e}");
            let mut older_args = HashMap::new();
            older_args.insert("objectGroup".to_string(), object_group.to_string());

            let value = client
                .call_extension(ext::GET_ROOT_WIDGET_SUMMARY_TREE, isolate_id, Some(older_args))
                .await?;
            parse_diagnostics_node_response(&value)
        }
        Err(e) => Err(e),
    }
}

/// Dispose an object group, invalidating every handle fetched under it.
pub async fn dispose_group(
    client: &VmServiceClient,
    isolate_id: &str,
    object_group: &str,
) -> Result<()> {
    let mut args = HashMap::new();
    args.insert("objectGroup".to_string(), object_group.to_string());
    client
        .call_extension(ext::DISPOSE_GROUP, isolate_id, Some(args))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_extension_params() {
        let params = build_extension_params(
            "isolates/1",
            Some([("groupName".to_string(), "g".to_string())].into()),
        );
        assert_eq!(params, json!({"isolateId": "isolates/1", "groupName": "g"}));
        assert_eq!(
            build_extension_params("isolates/1", None),
            json!({"isolateId": "isolates/1"})
        );
    }

    #[test]
    fn test_object_group_default() {
        assert_eq!(object_group(""), DEFAULT_OBJECT_GROUP);
        assert_eq!(object_group("tree-1"), "tree-1");
    }

    #[test]
    fn test_extension_not_available_detection() {
        assert!(is_extension_not_available(&Error::protocol(
            "VM Service error -32601: Method not found"
        )));
        assert!(is_extension_not_available(&Error::protocol(
            "VM Service error 113: Extension not available"
        )));
        assert!(!is_extension_not_available(&Error::protocol(
            "VM Service error -32602: Invalid params"
        )));
        assert!(!is_extension_not_available(&Error::ChannelClosed));
    }

    #[test]
    fn test_parse_diagnostics_node_response_unwraps_result() {
        let wrapped = json!({"result": {"description": "MaterialApp", "children": []}});
        assert_eq!(
            parse_diagnostics_node_response(&wrapped).unwrap().description,
            "MaterialApp"
        );

        let bare = json!({"description": "Scaffold"});
        assert_eq!(
            parse_diagnostics_node_response(&bare).unwrap().description,
            "Scaffold"
        );
    }

    #[test]
    fn test_parse_diagnostics_node_response_rejects_garbage() {
        let err = parse_diagnostics_node_response(&json!({"nope": 1})).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }
}
