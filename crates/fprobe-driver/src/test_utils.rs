//! Test utilities for driver consumers
//!
//! [`FakeConnector`] hands out [`FakeDriver`]s that serve a fixed widget tree
//! and record what was asked of them.

use std::sync::{Arc, Mutex};

use fprobe_core::prelude::*;
use fprobe_core::{ControlHandle, DiagnosticsNode, SocketAddress};

use crate::driver::{DriverClient, DriverConnector};
use crate::locator::Locator;

/// Build a widget tree node with the given children.
pub fn test_node(description: &str, widget_type: &str, children: Vec<DiagnosticsNode>) -> DiagnosticsNode {
    DiagnosticsNode {
        description: description.to_string(),
        node_type: Some(widget_type.to_string()),
        name: None,
        level: None,
        has_children: !children.is_empty(),
        value_id: Some(format!("inspector-{description}")),
        object_id: None,
        creation_location: None,
        created_by_local_project: true,
        children,
    }
}

/// A small app: `MaterialApp > Column > [Text("Hello"), Text("World"), ElevatedButton]`.
pub fn sample_tree() -> DiagnosticsNode {
    test_node(
        "MaterialApp",
        "MaterialApp",
        vec![test_node(
            "Column",
            "Column",
            vec![
                test_node("Text(\"Hello\")", "Text", vec![]),
                test_node("Text(\"World\")", "Text", vec![]),
                test_node("ElevatedButton", "ElevatedButton", vec![]),
            ],
        )],
    )
}

/// Driver serving a fixed tree.
#[derive(Debug, Clone)]
pub struct FakeDriver {
    tree: DiagnosticsNode,
    groups: Arc<Mutex<Vec<String>>>,
}

impl FakeDriver {
    pub fn new(tree: DiagnosticsNode) -> Self {
        Self {
            tree,
            groups: Arc::default(),
        }
    }

    /// Group names passed to `get_control_tree`, in call order
    pub fn requested_groups(&self) -> Vec<String> {
        self.groups.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl DriverClient for FakeDriver {
    async fn get_control_tree(&self, group_name: &str) -> Result<DiagnosticsNode> {
        self.groups
            .lock()
            .map_err(|_| Error::ChannelClosed)?
            .push(group_name.to_string());
        Ok(self.tree.clone())
    }

    async fn find_controls(&self, locator: &Locator) -> Result<Vec<ControlHandle>> {
        Ok(locator
            .find_all(&self.tree)
            .into_iter()
            .map(DiagnosticsNode::to_handle)
            .collect())
    }
}

/// Connector that records every address and returns drivers sharing one log.
#[derive(Debug, Clone)]
pub struct FakeConnector {
    driver: FakeDriver,
    addresses: Arc<Mutex<Vec<String>>>,
    refuse: bool,
}

impl FakeConnector {
    pub fn new(tree: DiagnosticsNode) -> Self {
        Self {
            driver: FakeDriver::new(tree),
            addresses: Arc::default(),
            refuse: false,
        }
    }

    /// Make every `connect` fail with a connection error.
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    /// Addresses passed to `connect`, in call order
    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Group names requested by any driver this connector handed out
    pub fn requested_groups(&self) -> Vec<String> {
        self.driver.requested_groups()
    }
}

impl DriverConnector for FakeConnector {
    type Client = FakeDriver;

    async fn connect(&self, address: &SocketAddress) -> Result<FakeDriver> {
        self.addresses
            .lock()
            .map_err(|_| Error::ChannelClosed)?
            .push(address.to_uri());
        if self.refuse {
            return Err(Error::connection(address.to_uri(), "connection refused"));
        }
        Ok(self.driver.clone())
    }
}
