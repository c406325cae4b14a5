//! Upstream streaming client
//!
//! Maintains one secure websocket to the provider, sends the subscription
//! frame within its deadline, and feeds every received frame through the
//! decoder. Decoded records flow into a bounded channel toward the
//! controller; when the channel is full the newest record is dropped and
//! counted rather than blocking the receive loop.
//!
//! # State machine
//!
//! ```text
//! Idle -> Connecting -> Subscribing -> Receiving -> Closing -> Idle
//!             ^                            |
//!             +------ Failed (1 s) <------+
//! ```
//!
//! Transport errors, unexpected closes and the subscription deadline all
//! land in `Failed`, which backs off and reconnects. Per-frame decode
//! errors only increment a counter; the loop keeps receiving. `stop` is
//! cooperative through the cancellation token and is honored within one
//! second.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use vesselcast_config::BoundingBox;
use vesselcast_metrics::BridgeMetrics;
use vesselcast_protocol::{decode, Decoded, VesselRecord};

use crate::subscription::subscription_frame;

/// Default hard deadline for the subscription send after handshake
const DEFAULT_SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Default fixed delay between a failure and the next connect attempt
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Grace given to the graceful close on cancellation
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Upstream client configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Provider websocket URL
    pub url: String,

    /// Provider API key
    pub api_key: String,

    /// Geographic subscription filter
    pub bounding_box: BoundingBox,

    /// Hard deadline for the subscription send
    pub subscribe_timeout: Duration,

    /// Delay between a failure and the next connect attempt
    pub reconnect_delay: Duration,
}

impl UpstreamConfig {
    /// Create config for a provider endpoint
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            bounding_box,
            subscribe_timeout: DEFAULT_SUBSCRIBE_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Set the subscription send deadline
    #[must_use]
    pub fn with_subscribe_timeout(mut self, timeout: Duration) -> Self {
        self.subscribe_timeout = timeout;
        self
    }

    /// Set the reconnect delay
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Client lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UpstreamState {
    /// Not running
    Idle = 0,
    /// Transport connect in progress
    Connecting = 1,
    /// Handshake done, subscription frame in flight
    Subscribing = 2,
    /// Subscribed, frames arriving
    Receiving = 3,
    /// Cooperative shutdown in progress
    Closing = 4,
    /// Transient failure, reconnect pending
    Failed = 5,
}

impl UpstreamState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Subscribing,
            3 => Self::Receiving,
            4 => Self::Closing,
            5 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Shared view of the client state
///
/// The controller exposes this through its status surface; the run loop is
/// the only writer.
#[derive(Debug, Default)]
pub struct UpstreamStatus {
    state: AtomicU8,
}

impl UpstreamStatus {
    /// Current lifecycle state
    pub fn state(&self) -> UpstreamState {
        UpstreamState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Whether the client is subscribed and receiving
    pub fn is_connected(&self) -> bool {
        self.state() == UpstreamState::Receiving
    }

    fn set(&self, state: UpstreamState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }
}

/// A decoded record on its way to the controller
#[derive(Debug)]
pub struct RecordEvent {
    /// The normalized record
    pub record: VesselRecord,
    /// The decoder defaulted a missing static-variant position
    pub defaulted_position: bool,
}

/// How one websocket session ended
enum SessionEnd {
    /// Cancellation observed; do not reconnect
    Cancelled,
    /// Transport or protocol failure; back off and reconnect
    Failed,
}

/// Upstream streaming client
pub struct UpstreamClient {
    config: UpstreamConfig,
    records: mpsc::Sender<RecordEvent>,
    metrics: Arc<BridgeMetrics>,
    status: Arc<UpstreamStatus>,
}

impl UpstreamClient {
    /// Create a client that feeds records into `records`
    pub fn new(
        config: UpstreamConfig,
        records: mpsc::Sender<RecordEvent>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        Self {
            config,
            records,
            metrics,
            status: Arc::new(UpstreamStatus::default()),
        }
    }

    /// Shared status handle, valid after `run` consumes the client
    pub fn status(&self) -> Arc<UpstreamStatus> {
        Arc::clone(&self.status)
    }

    /// Run the connect/receive/reconnect loop until cancellation
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(url = %self.config.url, "upstream client starting");

        loop {
            self.status.set(UpstreamState::Connecting);

            match self.session(&cancel).await {
                SessionEnd::Cancelled => break,
                SessionEnd::Failed => {
                    self.status.set(UpstreamState::Failed);
                    self.metrics.record_transport_error();

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                    }
                }
            }
        }

        self.status.set(UpstreamState::Idle);
        tracing::info!("upstream client stopped");
    }

    /// One connect-subscribe-receive session
    async fn session(&self, cancel: &CancellationToken) -> SessionEnd {
        let connected = tokio::select! {
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            result = connect_async(self.config.url.as_str()) => result,
        };

        let stream = match connected {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::warn!(url = %self.config.url, error = %e, "upstream connect failed");
                return SessionEnd::Failed;
            }
        };

        self.status.set(UpstreamState::Subscribing);
        let (mut sink, mut source) = stream.split();

        let frame = subscription_frame(&self.config.api_key, self.config.bounding_box);
        match timeout(self.config.subscribe_timeout, sink.send(Message::Text(frame))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "subscription send failed");
                return SessionEnd::Failed;
            }
            Err(_) => {
                tracing::warn!(
                    deadline_secs = self.config.subscribe_timeout.as_secs(),
                    "subscription send missed its deadline"
                );
                return SessionEnd::Failed;
            }
        }

        self.status.set(UpstreamState::Receiving);
        tracing::info!("upstream subscribed, receiving");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.status.set(UpstreamState::Closing);
                    let _ = timeout(CLOSE_GRACE, sink.send(Message::Close(None))).await;
                    return SessionEnd::Cancelled;
                }
                message = source.next() => match message {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_bytes()),
                    // Binary frames carry the same UTF-8 JSON
                    Some(Ok(Message::Binary(data))) => self.handle_frame(&data),
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(_))) => {
                        tracing::warn!("upstream closed the connection");
                        return SessionEnd::Failed;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "upstream transport error");
                        return SessionEnd::Failed;
                    }
                    None => {
                        tracing::warn!("upstream stream ended");
                        return SessionEnd::Failed;
                    }
                }
            }
        }
    }

    /// Decode one frame and forward the record
    ///
    /// Records are forwarded in arrival order. A full channel drops the
    /// newest record; a per-frame decode error is counted and skipped.
    fn handle_frame(&self, frame: &[u8]) {
        match decode(frame) {
            Ok(Decoded::Record {
                record,
                defaulted_position,
            }) => {
                self.metrics.record_received();
                if defaulted_position {
                    self.metrics.record_defaulted_position();
                }

                let event = RecordEvent {
                    record,
                    defaulted_position,
                };
                match self.records.try_send(event) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        self.metrics.record_dropped();
                        tracing::trace!("record channel full, dropping newest record");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        // Controller is gone; cancellation will end the loop
                    }
                }
            }
            Ok(Decoded::Ignored) => {
                tracing::trace!("frame variant not mapped, ignoring");
            }
            Err(e) => {
                self.metrics.record_decode_error();
                tracing::debug!(error = %e, "frame decode error");
            }
        }
    }
}

#[cfg(test)]
#[path = "upstream_test.rs"]
mod upstream_test;
