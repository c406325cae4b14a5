//! Stream broadcast server
//!
//! Serves NMEA sentences to TCP subscribers. Consumers connect and read;
//! the server never interprets anything they send. Each accepted peer is
//! watched by a monitor task that reads-and-discards to notice the peer
//! hanging up, and a periodic sweep evicts peers the monitor or a failed
//! write has marked dead.
//!
//! # Fan-out contract
//!
//! `broadcast` snapshots the peer registry under its lock, releases the
//! lock, then writes to every peer concurrently. A peer whose write errors
//! or times out is marked dead and evicted by the next sweep; the broadcast
//! returns how many peers accepted the full write. Per-peer writes are
//! serialized by a per-peer mutex, so concurrent broadcasts interleave whole
//! sentences, never bytes within one.
//!
//! The registry lock is never held across a network write.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::join_all;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use vesselcast_metrics::BridgeMetrics;

/// Stream broadcast server configuration
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Maximum simultaneous subscriber connections
    pub max_connections: usize,

    /// Write timeout per peer per broadcast
    pub write_timeout: Duration,

    /// How often dead peers are swept out of the registry
    pub sweep_interval: Duration,

    /// TCP keep-alive enabled on accepted peers
    pub keepalive: bool,

    /// TCP keep-alive interval (only used if keepalive is true)
    pub keepalive_interval: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 0,
            max_connections: 16,
            write_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(5),
            keepalive: true,
            keepalive_interval: Duration::from_secs(30),
        }
    }
}

impl BroadcastConfig {
    /// Create config for a host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the connection limit
    #[must_use]
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-peer write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the dead-peer sweep interval
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One connected subscriber
struct Peer {
    id: u64,
    addr: SocketAddr,
    /// Serializes writes to this peer across concurrent broadcasts
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    /// Set by the monitor on hang-up or by a failed write; the sweep evicts
    dead: AtomicBool,
    /// Cancelled on eviction so the monitor task exits promptly
    closed: CancellationToken,
}

impl Peer {
    fn mark_dead(&self) {
        self.dead.store(true, Ordering::Relaxed);
    }

    fn is_dead(&self) -> bool {
        self.dead.load(Ordering::Relaxed)
    }
}

/// The shared peer registry
///
/// The single lock wraps add, remove and snapshot; nothing network-facing
/// runs under it.
#[derive(Default)]
struct Registry {
    peers: Mutex<Vec<Arc<Peer>>>,
    next_peer_id: AtomicU64,
}

impl Registry {
    fn len(&self) -> usize {
        self.peers.lock().expect("peer registry poisoned").len()
    }

    /// Live peers, for fan-out
    fn snapshot(&self) -> Vec<Arc<Peer>> {
        self.peers
            .lock()
            .expect("peer registry poisoned")
            .iter()
            .filter(|p| !p.is_dead())
            .cloned()
            .collect()
    }

    fn add(&self, peer: Arc<Peer>) {
        self.peers.lock().expect("peer registry poisoned").push(peer);
    }

    /// Remove every dead peer, returning them for cleanup
    fn take_dead(&self) -> Vec<Arc<Peer>> {
        let mut peers = self.peers.lock().expect("peer registry poisoned");
        let mut dead = Vec::new();
        peers.retain(|peer| {
            if peer.is_dead() {
                dead.push(Arc::clone(peer));
                false
            } else {
                true
            }
        });
        dead
    }

    /// Remove every peer, returning them for cleanup
    fn drain(&self) -> Vec<Arc<Peer>> {
        let mut peers = self.peers.lock().expect("peer registry poisoned");
        peers.drain(..).collect()
    }
}

/// TCP broadcast server
///
/// Create once and drive through `start` / `broadcast` / `stop`.
/// Double-start is a no-op; a failed bind leaves the server stopped and the
/// process running.
pub struct BroadcastServer {
    config: BroadcastConfig,
    registry: Arc<Registry>,
    metrics: Arc<BridgeMetrics>,
    running: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
    /// Local address after a successful bind (useful when port 0 was asked)
    local_addr: Mutex<Option<SocketAddr>>,
}

impl BroadcastServer {
    /// Create a stopped server
    pub fn new(config: BroadcastConfig, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::default()),
            metrics,
            running: AtomicBool::new(false),
            cancel: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Whether the server is accepting connections
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Number of registered peers, dead ones included until the next sweep
    pub fn peer_count(&self) -> usize {
        self.registry.len()
    }

    /// The bound address, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().expect("local addr poisoned")
    }

    /// Bind and start accepting subscribers
    ///
    /// Returns `false` if the bind fails (the reason is logged and the rest
    /// of the system keeps running). Starting a running server is a no-op
    /// that returns `true`.
    pub async fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return true;
        }

        let bind_addr = self.config.bind_address();
        let listener = match TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::warn!(
                    address = %bind_addr,
                    error = %e,
                    "failed to bind stream server, stream output disabled"
                );
                self.running.store(false, Ordering::SeqCst);
                return false;
            }
        };

        if let Ok(addr) = listener.local_addr() {
            *self.local_addr.lock().expect("local addr poisoned") = Some(addr);
        }

        tracing::info!(
            address = %bind_addr,
            max_connections = self.config.max_connections,
            "stream broadcast server listening"
        );

        let cancel = CancellationToken::new();
        *self.cancel.lock().expect("cancel slot poisoned") = Some(cancel.clone());

        tokio::spawn(accept_loop(
            self.config.clone(),
            Arc::clone(&self.registry),
            listener,
            cancel.clone(),
        ));
        tokio::spawn(sweep_loop(
            self.config.sweep_interval,
            Arc::clone(&self.registry),
            cancel,
        ));

        true
    }

    /// Stop accepting, close every peer
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(cancel) = self.cancel.lock().expect("cancel slot poisoned").take() {
            cancel.cancel();
        }

        for peer in self.registry.drain() {
            peer.closed.cancel();
        }

        tracing::info!("stream broadcast server stopped");
    }

    /// Write `bytes` to every live peer concurrently
    ///
    /// Returns the number of peers that accepted the full write.
    pub async fn broadcast(&self, bytes: &[u8]) -> usize {
        let snapshot = self.registry.snapshot();
        if snapshot.is_empty() {
            return 0;
        }

        let writes = snapshot.iter().map(|peer| self.write_to_peer(peer, bytes));
        join_all(writes).await.into_iter().filter(|ok| *ok).count()
    }

    /// Write to one peer, marking it dead on error or timeout
    async fn write_to_peer(&self, peer: &Peer, bytes: &[u8]) -> bool {
        let result = timeout(self.config.write_timeout, async {
            let mut writer = peer.writer.lock().await;
            writer.write_all(bytes).await?;
            writer.flush().await
        })
        .await;

        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!(peer = %peer.addr, error = %e, "peer write failed, evicting");
                self.metrics.record_peer_write_error();
                peer.mark_dead();
                false
            }
            Err(_) => {
                tracing::debug!(peer = %peer.addr, "peer write timed out, evicting");
                self.metrics.record_peer_write_error();
                peer.mark_dead();
                false
            }
        }
    }
}

/// Main accept loop
async fn accept_loop(
    config: BroadcastConfig,
    registry: Arc<Registry>,
    listener: TcpListener,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            result = listener.accept() => match result {
                Ok((stream, peer_addr)) => {
                    register_peer(&config, &registry, stream, peer_addr, &cancel);
                }
                Err(e) => {
                    // Transient accept errors - log and continue
                    tracing::warn!(error = %e, "accept error");
                }
            }
        }
    }
}

/// Register an accepted connection, enforcing the connection limit
fn register_peer(
    config: &BroadcastConfig,
    registry: &Arc<Registry>,
    stream: TcpStream,
    peer_addr: SocketAddr,
    cancel: &CancellationToken,
) {
    if registry.len() >= config.max_connections {
        tracing::warn!(
            peer = %peer_addr,
            max_connections = config.max_connections,
            "connection limit reached, refusing peer"
        );
        drop(stream);
        return;
    }

    configure_socket(config, &stream);

    let (read_half, write_half) = stream.into_split();
    let peer = Arc::new(Peer {
        id: registry.next_peer_id.fetch_add(1, Ordering::Relaxed),
        addr: peer_addr,
        writer: tokio::sync::Mutex::new(write_half),
        dead: AtomicBool::new(false),
        closed: cancel.child_token(),
    });

    registry.add(Arc::clone(&peer));
    tracing::info!(peer = %peer_addr, peer_id = peer.id, "client connected");

    tokio::spawn(monitor_peer(peer, read_half));
}

/// Best-effort socket options; failures keep the connection
fn configure_socket(config: &BroadcastConfig, stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(error = %e, "failed to set TCP_NODELAY, continuing");
    }

    if config.keepalive {
        let sock_ref = SockRef::from(stream);
        let keepalive = TcpKeepalive::new().with_time(config.keepalive_interval);

        #[cfg(target_os = "linux")]
        let keepalive = keepalive.with_interval(config.keepalive_interval);

        if let Err(e) = sock_ref.set_tcp_keepalive(&keepalive) {
            tracing::debug!(error = %e, "failed to set TCP keep-alive, continuing");
        }
    }
}

/// Periodic dead-peer sweep
async fn sweep_loop(interval: Duration, registry: Arc<Registry>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                for peer in registry.take_dead() {
                    peer.closed.cancel();
                    tracing::info!(peer = %peer.addr, peer_id = peer.id, "client evicted");
                }
            }
        }
    }
}

/// Watch one peer for hang-up
///
/// The server never reads application data: whatever the peer sends is
/// discarded, and EOF or a read error marks the peer dead for the sweep.
async fn monitor_peer(peer: Arc<Peer>, mut read_half: OwnedReadHalf) {
    let mut buf = [0u8; 1024];
    loop {
        tokio::select! {
            _ = peer.closed.cancelled() => break,
            result = read_half.read(&mut buf) => match result {
                Ok(0) | Err(_) => {
                    peer.mark_dead();
                    break;
                }
                Ok(_) => {} // discard
            }
        }
    }
}

#[cfg(test)]
#[path = "tcp_test.rs"]
mod tcp_test;
