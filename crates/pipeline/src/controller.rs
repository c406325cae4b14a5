//! Service controller
//!
//! Owns the upstream client, both output sinks and the statistics counters,
//! and runs the record loop between them: encode each record, terminate
//! every sentence with exactly one CRLF, hand it to both outputs
//! concurrently, count everything.
//!
//! The controller is an owned value: construct it from a validated config,
//! wrap it in `Arc`, and drive it through `run`. There is no process-wide
//! mutable state; every lifecycle call routes through this value.
//!
//! # Ordering
//!
//! Records are processed in channel order and sentences are submitted to
//! both sinks in encoded order. Delivery order across the two sinks is
//! independent; within one broadcast, fan-out across peers is unordered.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use vesselcast_config::{BoundingBox, Config};
use vesselcast_metrics::{BridgeMetrics, MetricsReporter, MetricsSnapshot};
use vesselcast_protocol::NmeaEncoder;
use vesselcast_sinks::{BroadcastConfig, BroadcastServer, DatagramConfig, DatagramEmitter};
use vesselcast_sources::{
    RecordEvent, UpstreamClient, UpstreamConfig, UpstreamState, UpstreamStatus,
};

/// Bounded record queue between the upstream client and the record loop;
/// overflow drops the newest record
const RECORD_CHANNEL_CAPACITY: usize = 256;

/// Pause between stopping the upstream client and restarting it with a new
/// bounding box
const RESTART_DELAY: Duration = Duration::from_secs(1);

/// Ceiling on draining queued records at shutdown
const DRAIN_CEILING: Duration = Duration::from_secs(2);

/// A running upstream client task
struct UpstreamTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    status: Arc<UpstreamStatus>,
}

/// Point-in-time controller status for an external supervisor
#[derive(Debug, Clone)]
pub struct ControllerStatus {
    pub upstream_state: UpstreamState,
    pub upstream_connected: bool,
    pub stream_running: bool,
    pub datagram_running: bool,
    pub counters: MetricsSnapshot,
}

/// Service controller owning the upstream client, both output sinks, and
/// the counter set
pub struct Controller {
    config: Config,
    metrics: Arc<BridgeMetrics>,
    server: Arc<BroadcastServer>,
    emitter: Arc<DatagramEmitter>,
    records_tx: mpsc::Sender<RecordEvent>,
    records_rx: tokio::sync::Mutex<Option<mpsc::Receiver<RecordEvent>>>,
    upstream: tokio::sync::Mutex<Option<UpstreamTask>>,
    bounding_box: std::sync::Mutex<BoundingBox>,
}

impl Controller {
    /// Build a controller from a validated configuration
    pub fn new(config: Config) -> Self {
        let metrics = Arc::new(BridgeMetrics::new());

        let server_config =
            BroadcastConfig::new(config.network.stream.host.clone(), config.network.stream.port)
                .with_max_connections(config.network.stream.max_connections);
        let server = Arc::new(BroadcastServer::new(server_config, Arc::clone(&metrics)));

        let emitter_config = DatagramConfig::new(
            config.network.datagram.host.clone(),
            config.network.datagram.port,
        );
        let emitter = Arc::new(DatagramEmitter::new(emitter_config));

        let (records_tx, records_rx) = mpsc::channel(RECORD_CHANNEL_CAPACITY);
        let bounding_box = std::sync::Mutex::new(config.bounding_box);

        Self {
            config,
            metrics,
            server,
            emitter,
            records_tx,
            records_rx: tokio::sync::Mutex::new(Some(records_rx)),
            upstream: tokio::sync::Mutex::new(None),
            bounding_box,
        }
    }

    /// Shared counter set
    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Bound address of the stream server, once started
    pub fn stream_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    /// Number of connected stream subscribers
    pub fn stream_peer_count(&self) -> usize {
        self.server.peer_count()
    }

    /// Start the upstream client with the current bounding box
    ///
    /// No-op returning `true` if it is already running.
    pub async fn start_upstream(&self) -> bool {
        let mut slot = self.upstream.lock().await;
        if slot.is_some() {
            return true;
        }

        let bbox = *self.bounding_box.lock().expect("bounding box poisoned");
        let upstream_config = UpstreamConfig::new(
            self.config.stream_url.clone(),
            self.config.api_key.clone(),
            bbox,
        );
        let client = UpstreamClient::new(
            upstream_config,
            self.records_tx.clone(),
            Arc::clone(&self.metrics),
        );
        let status = client.status();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(client.run(cancel.clone()));

        *slot = Some(UpstreamTask {
            cancel,
            handle,
            status,
        });
        true
    }

    /// Stop the upstream client and wait for it to wind down
    pub async fn stop_upstream(&self) {
        let task = self.upstream.lock().await.take();
        if let Some(task) = task {
            task.cancel.cancel();
            let _ = task.handle.await;
        }
    }

    /// Start the stream broadcast server; `false` means the bind failed and
    /// the stream output stays disabled
    pub async fn start_stream_server(&self) -> bool {
        self.server.start().await
    }

    /// Stop the stream broadcast server, closing every subscriber
    pub async fn stop_stream_server(&self) {
        self.server.stop().await;
    }

    /// Start the datagram emitter
    pub async fn start_datagram(&self) -> bool {
        self.emitter.start().await
    }

    /// Stop the datagram emitter
    pub async fn stop_datagram(&self) {
        self.emitter.stop().await;
    }

    /// Swap the geographic filter and restart the upstream client
    ///
    /// The client is stopped, the restart waits one second, then the new
    /// box takes effect with the fresh subscription. Outputs keep running
    /// throughout.
    pub async fn replace_bounding_box(&self, bbox: BoundingBox) {
        tracing::info!(
            north = bbox.north,
            south = bbox.south,
            east = bbox.east,
            west = bbox.west,
            "replacing bounding box, restarting upstream client"
        );

        self.stop_upstream().await;
        tokio::time::sleep(RESTART_DELAY).await;
        *self.bounding_box.lock().expect("bounding box poisoned") = bbox;
        self.start_upstream().await;
    }

    /// Current status for the control surface
    pub async fn status(&self) -> ControllerStatus {
        let upstream_state = self
            .upstream
            .lock()
            .await
            .as_ref()
            .map(|task| task.status.state())
            .unwrap_or(UpstreamState::Idle);

        ControllerStatus {
            upstream_state,
            upstream_connected: upstream_state == UpstreamState::Receiving,
            stream_running: self.server.is_running(),
            datagram_running: self.emitter.is_running(),
            counters: self.metrics.snapshot(),
        }
    }

    /// Start every enabled component and run the record loop until
    /// cancellation
    ///
    /// On cancellation the queued records are drained with a two-second
    /// ceiling, then every component is stopped.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let Some(mut records) = self.records_rx.lock().await.take() else {
            tracing::warn!("controller run called twice, ignoring");
            return;
        };

        if self.config.network.enable_stream {
            self.start_stream_server().await;
        }
        if self.config.network.enable_datagram {
            self.start_datagram().await;
        }
        self.start_upstream().await;

        let reporter = MetricsReporter::new(
            Arc::clone(&self.metrics),
            self.config.logging.statistics_interval(),
        );
        let reporter_handle = tokio::spawn(reporter.run(cancel.child_token()));

        let mut encoder = NmeaEncoder::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = records.recv() => match event {
                    Some(event) => self.process_record(&mut encoder, event).await,
                    // The controller holds a sender, so this only happens
                    // if the channel is externally closed
                    None => break,
                }
            }
        }

        // Drain what is already queued, bounded
        let _ = timeout(DRAIN_CEILING, async {
            while let Ok(event) = records.try_recv() {
                self.process_record(&mut encoder, event).await;
            }
        })
        .await;

        self.stop_upstream().await;
        self.stop_stream_server().await;
        self.stop_datagram().await;
        let _ = reporter_handle.await;

        tracing::info!("controller stopped");
    }

    /// Encode one record and hand each sentence to both outputs
    async fn process_record(&self, encoder: &mut NmeaEncoder, event: RecordEvent) {
        let sentences = encoder.encode(&event.record);
        if sentences.is_empty() {
            self.metrics.record_encoder_skip();
            tracing::trace!(mmsi = event.record.mmsi, "record not encodable, skipping");
            return;
        }

        self.metrics
            .record_converted(event.record.kind.message_type());

        for sentence in sentences {
            let mut line = sentence.render();
            if !line.ends_with("\r\n") {
                line.push_str("\r\n");
            }
            let bytes = line.as_bytes();

            let (_sent, _emitted) = tokio::join!(
                async {
                    if self.config.network.enable_stream {
                        self.server.broadcast(bytes).await
                    } else {
                        0
                    }
                },
                async {
                    if self.config.network.enable_datagram {
                        self.emitter.emit(bytes).await
                    } else {
                        false
                    }
                },
            );

            self.metrics.record_broadcast();
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;
