//! Native (Android view system) control tree types
//!
//! The Android side of a UI-automation session reports its view hierarchy as a
//! map keyed by window, where each value is a positional `[title, root]` pair:
//!
//! ```json
//! {
//!   "a1b2c3d": ["com.example.MainActivity", {"type": "android.widget.FrameLayout", "children": []}]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Native controls of every window, keyed by window hashcode.
pub type NativeControlTree = BTreeMap<String, NativeControlEntry>;

/// `[window title, root control]` for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeControlEntry(pub String, pub NativeControl);

impl NativeControlEntry {
    pub fn root(&self) -> &NativeControl {
        &self.1
    }
}

/// A native view and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeControl {
    /// Fully qualified view class, e.g. `io.flutter.embedding.android.FlutterView`
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub children: Vec<NativeControl>,
}

impl NativeControl {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NativeControl>) -> Self {
        self.children = children;
        self
    }

    /// Append the type of this control and all descendants to `out`.
    pub fn collect_types<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.type_name);
        for child in &self.children {
            child.collect_types(out);
        }
    }
}
