//! Async WebSocket client for the Dart VM Service.
//!
//! The [`VmServiceClient`] connects to the Dart VM Service over WebSocket, sends
//! JSON-RPC 2.0 requests and routes responses back to callers via oneshot
//! channels.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     VmServiceClient                       │
//! │                                                           │
//! │  ┌──────────────┐        ┌───────────────────────────┐   │
//! │  │   Public API │        │   Background Task          │   │
//! │  │              │        │                            │   │
//! │  │  request() ──┼──cmd──▶│  WebSocket read/write loop │   │
//! │  │              │  chan  │  response → tracker        │   │
//! │  └──────────────┘        └───────────────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A client serves one connection. When the socket closes, pending and later
//! requests fail with [`Error::ChannelClosed`]; there is no reconnection.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use fprobe_core::prelude::*;
use fprobe_core::SocketAddress;

use super::inspector::build_extension_params;
use super::protocol::{
    parse_vm_message, VmInfo, VmRequestTracker, VmServiceError, VmServiceMessage,
    VmServiceRequest, VmServiceResponse,
};

/// Capacity of the command channel between the public API and the background task.
const CMD_CHANNEL_CAPACITY: usize = 32;

/// How long a single request may wait for its response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Internal command type
// ---------------------------------------------------------------------------

enum ClientCommand {
    /// Send a JSON-RPC request and deliver the response to `response_tx`.
    SendRequest {
        method: String,
        params: Option<serde_json::Value>,
        response_tx: oneshot::Sender<Result<serde_json::Value>>,
    },
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

// ---------------------------------------------------------------------------
// VmServiceClient
// ---------------------------------------------------------------------------

/// Async WebSocket client for the Dart VM Service.
///
/// The client spawns a background Tokio task that owns the WebSocket
/// connection. The task exits when the client is dropped (the command channel
/// closes) or when the socket closes.
pub struct VmServiceClient {
    address: String,
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl VmServiceClient {
    /// Connect to the VM Service at `address`.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] if the WebSocket handshake fails.
    pub async fn connect(address: &SocketAddress) -> Result<Self> {
        let uri = address.to_uri();
        info!("Connecting to VM Service at {}", uri);

        let (ws_stream, _response) = connect_async(uri.as_str())
            .await
            .map_err(|err| Error::connection(uri.clone(), err.to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>(CMD_CHANNEL_CAPACITY);
        tokio::spawn(run_io_loop(ws_stream, cmd_rx));

        Ok(Self {
            address: uri,
            cmd_tx,
        })
    }

    /// The WebSocket URI this client is connected to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send a JSON-RPC request and wait for the response.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelClosed`] if the connection is gone.
    /// - [`Error::Protocol`] if the VM Service returned a JSON-RPC error.
    /// - [`Error::VmService`] if the response had no `result` or timed out.
    pub async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let (response_tx, response_rx) = oneshot::channel();
        self.cmd_tx
            .send(ClientCommand::SendRequest {
                method: method.to_string(),
                params,
                response_tx,
            })
            .await
            .map_err(|_| Error::ChannelClosed)?;

        match tokio::time::timeout(REQUEST_TIMEOUT, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ChannelClosed),
            Err(_) => Err(Error::vm_service(format!(
                "{method} timed out after {REQUEST_TIMEOUT:?}"
            ))),
        }
    }

    /// Call `getVM` to list the running isolates.
    pub async fn get_vm(&self) -> Result<VmInfo> {
        let result = self.request("getVM", None).await?;
        serde_json::from_value(result)
            .map_err(|e| Error::vm_service(format!("parse getVM response: {e}")))
    }

    /// ID of the main Flutter UI isolate.
    ///
    /// # Errors
    ///
    /// [`Error::VmService`] if the VM has no non-system isolate.
    pub async fn main_isolate_id(&self) -> Result<String> {
        let vm = self.get_vm().await?;
        vm.main_isolate()
            .map(|iso| iso.id.clone())
            .ok_or_else(|| Error::vm_service("no non-system isolate found"))
    }

    /// Call a Flutter service extension method on `isolate_id`.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] when the extension is not registered (code `-32601`
    /// or `113`), plus anything [`VmServiceClient::request`] returns.
    pub async fn call_extension(
        &self,
        method: &str,
        isolate_id: &str,
        args: Option<HashMap<String, String>>,
    ) -> Result<serde_json::Value> {
        let params = build_extension_params(isolate_id, args);
        self.request(method, Some(params)).await
    }
}

// ---------------------------------------------------------------------------
// Background task
// ---------------------------------------------------------------------------

/// Read/write select loop for one connection.
async fn run_io_loop(ws_stream: WsStream, mut cmd_rx: mpsc::Receiver<ClientCommand>) {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();
    let mut tracker = VmRequestTracker::new();

    loop {
        tokio::select! {
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_ws_text(text.as_str(), &mut tracker);
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("VM Service: received Close frame");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong/Binary
                    }
                    Some(Err(err)) => {
                        warn!("VM Service: WebSocket read error: {}", err);
                        break;
                    }
                    None => {
                        debug!("VM Service: WebSocket stream ended");
                        break;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ClientCommand::SendRequest { method, params, response_tx }) => {
                        handle_send_request(&method, params, response_tx, &mut tracker, &mut ws_sink)
                            .await;
                    }
                    None => {
                        send_close(&mut ws_sink).await;
                        break;
                    }
                }
            }
        }
    }

    if tracker.pending_count() > 0 {
        debug!(
            "VM Service: dropping {} pending request(s)",
            tracker.pending_count()
        );
    }
    debug!("VM Service background task exiting");
}

/// Route an incoming WebSocket text frame to the tracker.
fn handle_ws_text(text: &str, tracker: &mut VmRequestTracker) {
    match parse_vm_message(text) {
        VmServiceMessage::Response(mut response) => {
            if let Some(id) = response.id.take() {
                if !tracker.complete(&id, response) {
                    debug!("VM Service: response for unknown request id {}", id);
                }
            }
        }
        VmServiceMessage::Notification(method) => {
            trace!("VM Service: ignoring notification {}", method);
        }
        VmServiceMessage::Unknown(raw) => {
            debug!(
                "VM Service: ignoring unknown message: {}",
                raw.chars().take(120).collect::<String>()
            );
        }
    }
}

/// Register a pending request, serialize it and write it to the sink.
///
/// Delivers an error to `response_tx` if serialization or the write fails.
async fn handle_send_request(
    method: &str,
    params: Option<serde_json::Value>,
    response_tx: oneshot::Sender<Result<serde_json::Value>>,
    tracker: &mut VmRequestTracker,
    ws_sink: &mut SplitSink<WsStream, WsMessage>,
) {
    // Register before writing so a fast response finds its slot.
    let (id, response_rx) = tracker.register();
    let request = VmServiceRequest::new(id, method, params);

    let json = match serde_json::to_string(&request) {
        Ok(j) => j,
        Err(err) => {
            let e = Error::protocol(format!("Failed to serialize VM Service request: {err}"));
            let _ = response_tx.send(Err(e));
            return;
        }
    };

    if let Err(err) = ws_sink.send(WsMessage::Text(json.into())).await {
        let e = Error::vm_service(format!("Failed to send VM Service request: {err}"));
        let _ = response_tx.send(Err(e));
        return;
    }

    tokio::spawn(async move {
        let result = match response_rx.await {
            Ok(response) => vm_response_to_result(response),
            // The tracker was dropped with the connection.
            Err(_) => Err(Error::ChannelClosed),
        };
        let _ = response_tx.send(result);
    });
}

fn vm_response_to_result(response: VmServiceResponse) -> Result<serde_json::Value> {
    if let Some(error) = response.error {
        Err(vm_error_to_error(error))
    } else if let Some(result) = response.result {
        Ok(result)
    } else {
        Err(Error::vm_service(
            "VM Service response contained neither result nor error",
        ))
    }
}

fn vm_error_to_error(err: VmServiceError) -> Error {
    Error::protocol(format!("VM Service error {}: {}", err.code, err.message))
}

async fn send_close(ws_sink: &mut SplitSink<WsStream, WsMessage>) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.close().await;
}
