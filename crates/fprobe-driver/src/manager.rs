//! Control manager
//!
//! Entry point for driving a Flutter app on a device. Every operation
//! rediscovers the VM Service endpoint and connects a fresh client: the app
//! may have restarted on a new port since the last call.

use fprobe_core::prelude::*;
use fprobe_core::{ControlHandle, DiagnosticsNode, SocketAddress, WindowTarget};
use fprobe_device::{
    discover_endpoint, window_process, ActivityProvider, DiscoveryOptions, LogSource,
    PortForwarder, WindowProvider,
};

use crate::driver::{DriverClient, DriverConnector};
use crate::locator::Locator;
use crate::view::{FlutterView, ViewKind};

/// Flutter control access for one device.
///
/// `D` is the device (log source and port forwarder, plus window and activity
/// lists for [`ControlManager::window_process`]). `C` builds driver clients.
pub struct ControlManager<D, C> {
    device: D,
    connector: C,
    discovery: DiscoveryOptions,
}

impl<D, C> ControlManager<D, C>
where
    D: LogSource + PortForwarder,
    C: DriverConnector,
{
    pub fn new(device: D, connector: C) -> Self {
        Self {
            device,
            connector,
            discovery: DiscoveryOptions::default(),
        }
    }

    pub fn with_discovery_options(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        self.discovery
    }

    /// Discover the VM Service address, forwarding its port.
    ///
    /// Not cached; every call polls the device log again.
    pub async fn socket_address(&self) -> Result<SocketAddress> {
        discover_endpoint(&self.device, &self.device, self.discovery).await
    }

    /// Discover the endpoint and connect a new driver client to it.
    pub async fn driver(&self) -> Result<C::Client> {
        let address = self.socket_address().await?;
        self.connector.connect(&address).await
    }

    /// The app's widget tree, with references scoped to `group_name`.
    pub async fn control_tree(&self, group_name: &str) -> Result<DiagnosticsNode> {
        let driver = self.driver().await?;
        driver.get_control_tree(group_name).await
    }

    /// The single control matching `locator`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLocator`] if `locator` does not parse.
    /// - [`Error::ControlNotFound`] if nothing matches.
    /// - [`Error::AmbiguousControl`] if more than one control matches.
    pub async fn find_control(&self, locator: &str) -> Result<ControlHandle> {
        let locator: Locator = locator.parse()?;
        let driver = self.driver().await?;
        let mut controls = driver.find_controls(&locator).await?;

        match controls.len() {
            0 => Err(Error::control_not_found(locator.to_string())),
            1 => Ok(controls.remove(0)),
            count => Err(Error::ambiguous_control(locator.to_string(), count)),
        }
    }

    /// A [`FlutterView`] over a freshly connected driver.
    pub async fn flutter_view(&self) -> Result<FlutterView<C::Client>> {
        let driver = self.driver().await?;
        Ok(FlutterView::new(driver).await)
    }

    /// Kind of control hosted by the window titled `window_title`.
    ///
    /// Always fails with [`Error::NotImplemented`].
    pub async fn control_type(&self, window_title: &str) -> Result<ViewKind> {
        Err(Error::not_implemented(format!(
            "control type of window '{window_title}'"
        )))
    }
}

impl<D, C> ControlManager<D, C>
where
    D: LogSource + PortForwarder + WindowProvider + ActivityProvider,
    C: DriverConnector,
{
    /// Process owning the window `target`; `None` if no activity hosts it.
    pub async fn window_process(
        &self,
        target: impl Into<WindowTarget>,
    ) -> Result<Option<String>> {
        window_process(&self.device, &self.device, &target.into()).await
    }
}
