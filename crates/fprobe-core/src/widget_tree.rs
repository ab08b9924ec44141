//! # Control Tree Domain Types
//!
//! Flutter's diagnostic/widget tree as returned by the VM Service inspector
//! extensions (e.g. `ext.flutter.inspector.getRootWidgetTree`), plus the
//! [`ControlHandle`] a query hands back for a single matched node.
//!
//! ## Key Types
//!
//! - [`DiagnosticsNode`] - A node in Flutter's diagnostic tree
//! - [`CreationLocation`] - Source location where a widget was instantiated
//! - [`ControlHandle`] - Opaque reference to one control found by a query

use serde::{Deserialize, Serialize};

// ============================================================================
// DiagnosticsNode
// ============================================================================

/// A node in Flutter's diagnostic tree.
///
/// The JSON fields use camelCase (Flutter convention); serde handles mapping to
/// Rust's snake_case fields via `#[serde(rename_all = "camelCase")]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsNode {
    /// Widget/object description (e.g., "Container", "Text('Hello')")
    pub description: String,

    /// Runtime type as string
    #[serde(rename = "type")]
    pub node_type: Option<String>,

    /// Property name (for property nodes)
    pub name: Option<String>,

    /// Diagnostic level: "info", "debug", "warning", "error", "hidden", "off"
    pub level: Option<String>,

    /// Whether this node has children
    #[serde(default)]
    pub has_children: bool,

    /// VM Service object ID for this node's value, used as `arg` in subsequent calls
    pub value_id: Option<String>,

    /// VM Service object ID for the DiagnosticsNode itself
    pub object_id: Option<String>,

    /// Source code location where the widget was created
    pub creation_location: Option<CreationLocation>,

    /// Whether this widget was created by user's project code (vs framework)
    #[serde(default)]
    pub created_by_local_project: bool,

    /// Child nodes (populated when subtreeDepth > 0)
    #[serde(default)]
    pub children: Vec<DiagnosticsNode>,
}

impl DiagnosticsNode {
    /// Whether this node should be shown in a summary view.
    ///
    /// Filters out nodes with `hidden` or `off` diagnostic levels.
    pub fn is_visible(&self) -> bool {
        !matches!(self.level.as_deref(), Some("hidden") | Some("off"))
    }

    /// Visit every node of this subtree depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DiagnosticsNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Count total nodes in this subtree (including self).
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Build a handle referring to this node.
    pub fn to_handle(&self) -> ControlHandle {
        ControlHandle {
            value_id: self.value_id.clone(),
            object_id: self.object_id.clone(),
            description: self.description.clone(),
            widget_type: self.widget_type().to_string(),
        }
    }

    /// The widget's class name.
    ///
    /// Falls back to the description up to the first `(` or `-` when the
    /// inspector omitted the runtime type (summary trees do this).
    pub fn widget_type(&self) -> &str {
        if let Some(ref t) = self.node_type {
            if !t.is_empty() && t != "_ElementDiagnosticableTreeNode" {
                return t;
            }
        }
        self.description
            .split(|c: char| c == '(' || c == '-')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

// ============================================================================
// CreationLocation
// ============================================================================

/// Source location where a Flutter widget was instantiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationLocation {
    /// File URI (e.g., "file:///path/to/main.dart")
    pub file: String,

    /// Line number (1-based)
    pub line: u32,

    /// Column number (1-based)
    pub column: u32,
}

// ============================================================================
// ControlHandle
// ============================================================================

/// Reference to a single control returned by a query.
///
/// Valid only while the inspector object group it was fetched under is alive;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlHandle {
    pub value_id: Option<String>,
    pub object_id: Option<String>,
    pub description: String,
    pub widget_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(
        description: &str,
        node_type: Option<&str>,
        children: Vec<DiagnosticsNode>,
    ) -> DiagnosticsNode {
        DiagnosticsNode {
            description: description.to_string(),
            node_type: node_type.map(str::to_string),
            name: None,
            level: None,
            has_children: !children.is_empty(),
            value_id: Some(format!("inspector-{description}")),
            object_id: None,
            creation_location: None,
            created_by_local_project: false,
            children,
        }
    }

    #[test]
    fn test_parse_inspector_json() {
        let json = r#"{
            "description": "MaterialApp",
            "type": "_ElementDiagnosticableTreeNode",
            "hasChildren": true,
            "valueId": "inspector-0",
            "createdByLocalProject": true,
            "creationLocation": {"file": "file:///app/lib/main.dart", "line": 10, "column": 12},
            "children": [
                {"description": "Text(\"Hello\")", "valueId": "inspector-1"}
            ]
        }"#;
        let root: DiagnosticsNode = serde_json::from_str(json).unwrap();
        assert_eq!(root.children.len(), 1);
        assert!(root.created_by_local_project);
        assert_eq!(root.widget_type(), "MaterialApp");
        assert_eq!(root.children[0].widget_type(), "Text");
    }

    #[test]
    fn test_walk_is_depth_first() {
        let tree = node(
            "A",
            None,
            vec![node("B", None, vec![node("C", None, vec![])]), node("D", None, vec![])],
        );
        let mut seen = Vec::new();
        tree.walk(&mut |n| seen.push(n.description.clone()));
        assert_eq!(seen, vec!["A", "B", "C", "D"]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_is_visible() {
        let mut n = node("A", None, vec![]);
        assert!(n.is_visible());
        n.level = Some("hidden".to_string());
        assert!(!n.is_visible());
    }

    #[test]
    fn test_to_handle() {
        let handle = node("Padding-[<'pad'>]", Some("Padding"), vec![]).to_handle();
        assert_eq!(handle.widget_type, "Padding");
        assert_eq!(handle.value_id.as_deref(), Some("inspector-Padding-[<'pad'>]"));
    }
}
