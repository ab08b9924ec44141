//! Dart VM Service WebSocket protocol types and client.
//!
//! ## Modules
//!
//! - [`protocol`] - JSON-RPC types, the request tracker and the message parser.
//! - [`client`] - Async WebSocket client with a channel-based API.
//! - [`inspector`] - Flutter widget inspector extension calls.
//!
//! ## Quick start
//!
//! ```ignore
//! use fprobe_driver::vm_service::{inspector, VmServiceClient};
//!
//! let client = VmServiceClient::connect(&address).await?;
//! let isolate_id = client.main_isolate_id().await?;
//! let tree = inspector::get_root_widget_tree(&client, &isolate_id, "fprobe").await?;
//! ```

pub mod client;
pub mod inspector;
pub mod protocol;

pub use client::{VmServiceClient, REQUEST_TIMEOUT};
pub use inspector::{ext, get_root_widget_tree, DEFAULT_OBJECT_GROUP};
pub use protocol::{
    parse_vm_message, IsolateRef, VmInfo, VmRequestTracker, VmServiceError, VmServiceMessage,
    VmServiceRequest, VmServiceResponse,
};
