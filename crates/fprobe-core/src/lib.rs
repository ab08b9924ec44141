//! # fprobe-core - Core Domain Types
//!
//! Foundation crate for flutter-probe. Provides domain types, error handling
//! and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, regex, tracing, url).
//!
//! ## Public API
//!
//! ### Endpoints (`endpoint`)
//! - [`DebugUrl`] - VM Service URL announced in the device log
//! - [`SocketAddress`] - WebSocket address derived from a [`DebugUrl`]
//!
//! ### Windows (`types`)
//! - [`Window`], [`Activity`] - Window manager and activity manager records
//! - [`WindowTarget`], [`WindowKey`] - Inputs to window-to-process resolution
//!
//! ### Control Trees (`widget_tree`, `controls`)
//! - [`DiagnosticsNode`] - Flutter inspector tree node
//! - [`ControlHandle`] - Reference to one control found by a query
//! - [`NativeControlTree`] - Android view hierarchy keyed by window
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use fprobe_core::prelude::*;
//! ```

pub mod controls;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod types;
pub mod widget_tree;

/// Prelude for common imports used throughout all flutter-probe crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use controls::{NativeControl, NativeControlEntry, NativeControlTree};
pub use endpoint::{DebugUrl, SocketAddress};
pub use error::{Error, Result, ResultExt};
pub use types::{Activity, Window, WindowKey, WindowTarget, STATUS_BAR, SYSTEM_UI_PROCESS};
pub use widget_tree::{ControlHandle, CreationLocation, DiagnosticsNode};
