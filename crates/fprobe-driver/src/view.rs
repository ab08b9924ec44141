//! View classification
//!
//! Detects whether an Android window hosts Flutter content by looking for the
//! engine's root view class in the native control tree.

use serde::Serialize;

use fprobe_core::prelude::*;
use fprobe_core::NativeControlTree;

use crate::driver::DriverClient;

/// Substring identifying Flutter's root view class
/// (`io.flutter.embedding.android.FlutterView`, `io.flutter.view.FlutterView`).
pub const FLUTTER_VIEW_MARKER: &str = "FlutterView";

/// Classification tag of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewKind(String);

impl ViewKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether any control of any window is a Flutter root view.
pub fn is_flutter_view(tree: &NativeControlTree) -> bool {
    let mut types = Vec::new();
    for entry in tree.values() {
        entry.root().collect_types(&mut types);
    }
    types.iter().any(|t| t.contains(FLUTTER_VIEW_MARKER))
}

/// Classify the view behind `client`.
///
/// There is no classification scheme yet; this always fails with
/// [`Error::NotImplemented`].
pub async fn classify<C: DriverClient>(_client: &C) -> Result<ViewKind> {
    Err(Error::not_implemented("view classification"))
}

/// A Flutter view together with its kind, computed once when created.
pub struct FlutterView<C> {
    client: C,
    kind: Option<ViewKind>,
}

impl<C: DriverClient> FlutterView<C> {
    pub async fn new(client: C) -> Self {
        let kind = match classify(&client).await {
            Ok(kind) => Some(kind),
            Err(e) => {
                debug!("View kind unavailable: {}", e);
                None
            }
        };
        Self { client, kind }
    }

    /// The kind computed at construction.
    ///
    /// # Errors
    ///
    /// [`Error::NotImplemented`] when classification produced nothing.
    pub fn kind(&self) -> Result<&ViewKind> {
        self.kind
            .as_ref()
            .ok_or_else(|| Error::not_implemented("view classification"))
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
