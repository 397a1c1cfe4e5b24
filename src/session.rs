//! Per-connection session protocol.
//!
//! A [`Connection`] is Open while its value is alive and its outbox has a
//! reader. [`SessionHandler::on_disconnect`] consumes it, so a Closed
//! connection cannot receive or send anything further.

use std::fmt;

use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::dsp::renderer::synthesize;
use crate::dsp::sampling::SamplingConfig;
use crate::error::ParamError;
use crate::params::{RawParams, WaveformParams};
use crate::protocol::{ClientEvent, ServerEvent, WaveformResult};

/// Identifies one duplex channel for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        ConnectionId(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Replies queued per connection before the handler waits on the writer.
pub const OUTBOX_CAPACITY: usize = 4;

/// One open connection: its id plus a bounded outbox that only this
/// connection's writer drains. Replies are addressed by holding the
/// `Connection`, never by topic, so there is no way to broadcast.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    outbox: mpsc::Sender<ServerEvent>,
}

impl Connection {
    /// Open a connection. The receiver feeds the transport writer.
    pub fn open() -> (Self, mpsc::Receiver<ServerEvent>) {
        Self::with_capacity(OUTBOX_CAPACITY)
    }

    fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (outbox, rx) = mpsc::channel(capacity);
        (
            Connection {
                id: ConnectionId::new(),
                outbox,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// False once the transport side has gone away.
    pub fn is_open(&self) -> bool {
        !self.outbox.is_closed()
    }

    /// Queue an event for this connection, waiting while the outbox is
    /// full. Returns false if the writer is gone, in which case the event
    /// is dropped.
    pub async fn emit(&self, event: ServerEvent) -> bool {
        self.outbox.send(event).await.is_ok()
    }
}

/// Handles the lifecycle and `update_params` events of every connection.
///
/// Holds only immutable configuration, so one handler is shared by all
/// connections without locking.
#[derive(Debug, Clone)]
pub struct SessionHandler {
    sampling: SamplingConfig,
    offload_threshold: usize,
}

impl SessionHandler {
    pub fn new(config: &ServerConfig) -> Self {
        SessionHandler {
            sampling: config.sampling,
            offload_threshold: config.offload_threshold,
        }
    }

    /// Synthesize `params` on the current thread.
    pub fn render(&self, params: WaveformParams) -> WaveformResult {
        let data = synthesize(
            &params.shape,
            params.frequency,
            params.amplitude,
            &self.sampling,
        );
        WaveformResult { data, params }
    }

    /// Synthesize `params`, moving large renders onto the blocking pool.
    /// `None` only if the offloaded task was cancelled or panicked.
    pub async fn render_async(&self, params: WaveformParams) -> Option<WaveformResult> {
        if self.sampling.sample_count() <= self.offload_threshold {
            return Some(self.render(params));
        }
        let handler = self.clone();
        match tokio::task::spawn_blocking(move || handler.render(params)).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("Offloaded render failed: {}", e);
                None
            }
        }
    }

    /// Push the default waveform to a freshly opened connection.
    pub async fn on_connect(&self, conn: &Connection) {
        tracing::info!("Client connected: {}", conn.id());
        if let Some(result) = self.render_async(WaveformParams::initial()).await {
            self.reply(conn, result).await;
        }
    }

    /// Close the connection. Nothing is shared per connection, so this only
    /// drops the outbox and records the event.
    pub fn on_disconnect(&self, conn: Connection) {
        tracing::info!("Client disconnected: {}", conn.id());
    }

    /// Coerce, clamp, render and reply to the sender only.
    ///
    /// A payload that cannot be coerced is rejected: nothing is sent, the
    /// client keeps its previous plot, and the failure is logged.
    pub async fn on_update_params(
        &self,
        conn: &Connection,
        payload: &Value,
    ) -> Result<WaveformParams, ParamError> {
        let params = match RawParams::from_value(payload).and_then(|raw| raw.resolve()) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("Rejected update_params from {}: {}", conn.id(), e);
                return Err(e);
            }
        };

        if let Some(result) = self.render_async(params.clone()).await {
            tracing::debug!(
                "Received params from {}: {}, {}Hz, {}Amp",
                conn.id(),
                params.shape,
                params.frequency,
                params.amplitude
            );
            self.reply(conn, result).await;
        }
        Ok(params)
    }

    /// Dispatch one decoded client event.
    pub async fn on_event(&self, conn: &Connection, event: ClientEvent) {
        match event {
            ClientEvent::UpdateParams(payload) => {
                // Rejections are logged inside; the session carries on.
                let _ = self.on_update_params(conn, &payload).await;
            }
            ClientEvent::Unknown(name) => {
                tracing::warn!("Ignoring unknown event '{}' from {}", name, conn.id());
            }
        }
    }

    /// A slow reader fills the outbox and this waits, which in turn
    /// pauses reading further frames from that client.
    async fn reply(&self, conn: &Connection, result: WaveformResult) {
        if !conn.emit(ServerEvent::WaveformData(result)).await {
            tracing::debug!("Dropped reply for closed connection {}", conn.id());
        }
    }
}
