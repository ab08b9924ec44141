//! Driver client seam
//!
//! [`DriverClient`] is everything the control manager needs from a connected
//! Flutter app; [`DriverConnector`] builds one from a discovered address.
//! The VM Service implementations live here too.

use fprobe_core::prelude::*;
use fprobe_core::{ControlHandle, DiagnosticsNode, SocketAddress};

use crate::locator::Locator;
use crate::vm_service::inspector::{dispose_group, get_root_widget_tree, object_group};
use crate::vm_service::VmServiceClient;

/// Object group used for locator queries, disposed once the matches are built.
pub const QUERY_OBJECT_GROUP: &str = "fprobe-query";

/// A connected Flutter app.
#[trait_variant::make(DriverClient: Send)]
pub trait LocalDriverClient {
    /// Fetch the whole widget tree, with references scoped to `group_name`.
    ///
    /// An empty group name selects the default group.
    async fn get_control_tree(&self, group_name: &str) -> Result<DiagnosticsNode>;

    /// Every control matching `locator`, in tree order.
    async fn find_controls(&self, locator: &Locator) -> Result<Vec<ControlHandle>>;
}

/// Builds a fresh [`DriverClient`] for an endpoint.
#[trait_variant::make(DriverConnector: Send)]
pub trait LocalDriverConnector {
    type Client: DriverClient;

    async fn connect(&self, address: &SocketAddress) -> Result<Self::Client>;
}

// ---------------------------------------------------------------------------
// VM Service implementation
// ---------------------------------------------------------------------------

/// [`DriverClient`] speaking to the main isolate over the VM Service.
pub struct VmServiceDriver {
    client: VmServiceClient,
    isolate_id: String,
}

impl VmServiceDriver {
    /// Connect and locate the main isolate.
    pub async fn connect(address: &SocketAddress) -> Result<Self> {
        let client = VmServiceClient::connect(address).await?;
        let isolate_id = client.main_isolate_id().await?;
        debug!("Driving isolate {} at {}", isolate_id, client.address());
        Ok(Self { client, isolate_id })
    }

    pub fn isolate_id(&self) -> &str {
        &self.isolate_id
    }

    pub fn client(&self) -> &VmServiceClient {
        &self.client
    }
}

impl DriverClient for VmServiceDriver {
    async fn get_control_tree(&self, group_name: &str) -> Result<DiagnosticsNode> {
        let group = object_group(group_name);
        let tree = get_root_widget_tree(&self.client, &self.isolate_id, group).await?;
        debug!("Fetched {} widget tree nodes in group {}", tree.node_count(), group);
        Ok(tree)
    }

    async fn find_controls(&self, locator: &Locator) -> Result<Vec<ControlHandle>> {
        let tree = DriverClient::get_control_tree(self, QUERY_OBJECT_GROUP).await?;
        let handles: Vec<ControlHandle> = locator
            .find_all(&tree)
            .into_iter()
            .map(DiagnosticsNode::to_handle)
            .collect();
        trace!("{} control(s) match {}", handles.len(), locator);

        if let Err(e) = dispose_group(&self.client, &self.isolate_id, QUERY_OBJECT_GROUP).await {
            warn!("Failed to dispose object group {}: {}", QUERY_OBJECT_GROUP, e);
        }
        Ok(handles)
    }
}

/// [`DriverConnector`] producing [`VmServiceDriver`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct VmServiceConnector;

impl DriverConnector for VmServiceConnector {
    type Client = VmServiceDriver;

    async fn connect(&self, address: &SocketAddress) -> Result<VmServiceDriver> {
        VmServiceDriver::connect(address).await
    }
}
