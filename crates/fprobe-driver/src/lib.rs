//! # fprobe-driver - Flutter App Control
//!
//! Talks to a running Flutter app through the Dart VM Service and ties it to
//! device-side discovery.
//!
//! Depends on [`fprobe_core`] for domain types and [`fprobe_device`] for
//! endpoint discovery and window resolution.
//!
//! ## Public API
//!
//! ### Control Manager
//! - [`ControlManager`] - Discover, connect and query in one call
//!
//! ### Driver
//! - [`DriverClient`], [`DriverConnector`] - Seam between the manager and the wire
//! - [`VmServiceDriver`], [`VmServiceConnector`] - VM Service implementations
//! - [`Locator`] - `Field=Value && Field~=Value` control queries
//!
//! ### Views
//! - [`is_flutter_view()`] - Does a native control tree contain a Flutter root view
//! - [`FlutterView`], [`ViewKind`] - View handle and its kind

pub mod driver;
pub mod locator;
pub mod manager;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod view;
pub mod vm_service;

pub use driver::{
    DriverClient, DriverConnector, LocalDriverClient, LocalDriverConnector, VmServiceConnector,
    VmServiceDriver, QUERY_OBJECT_GROUP,
};
pub use locator::{Locator, LocatorField, MatchOp, Predicate};
pub use manager::ControlManager;
pub use view::{classify, is_flutter_view, FlutterView, ViewKind, FLUTTER_VIEW_MARKER};
pub use vm_service::VmServiceClient;
