//! Datagram emitter
//!
//! Sends each sentence as exactly one UDP datagram to the configured
//! endpoint. Fire-and-forget: no retries, no acknowledgment. The socket has
//! its broadcast bit set so subnet-broadcast targets work.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;

/// Datagram emitter configuration
#[derive(Debug, Clone)]
pub struct DatagramConfig {
    /// Destination address; subnet broadcast addresses are supported
    pub host: String,

    /// Destination port
    pub port: u16,
}

impl DatagramConfig {
    /// Create config for a target host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the target socket address string
    pub fn target_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// UDP datagram emitter
///
/// Create once, share as `Arc`, drive through `start` / `emit` / `stop`.
/// Emitting while stopped returns `false` without logging noise; the
/// controller gates on its own enable flag anyway.
pub struct DatagramEmitter {
    config: DatagramConfig,
    socket: Mutex<Option<Arc<UdpSocket>>>,
    running: AtomicBool,
}

impl DatagramEmitter {
    /// Create a stopped emitter
    pub fn new(config: DatagramConfig) -> Self {
        Self {
            config,
            socket: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Whether the emitter holds a ready socket
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Bind an ephemeral socket and aim it at the target
    ///
    /// Returns `false` if binding or connecting fails (reason logged); the
    /// rest of the system keeps running. Double-start is a no-op returning
    /// `true`.
    pub async fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return true;
        }

        let target = self.config.target_address();
        let socket = match UdpSocket::bind("0.0.0.0:0").await {
            Ok(socket) => socket,
            Err(e) => {
                tracing::warn!(error = %e, "failed to bind datagram socket, datagram output disabled");
                self.running.store(false, Ordering::SeqCst);
                return false;
            }
        };

        if let Err(e) = socket.set_broadcast(true) {
            tracing::warn!(error = %e, "failed to enable broadcast bit, continuing");
        }

        if let Err(e) = socket.connect(&target).await {
            tracing::warn!(
                target = %target,
                error = %e,
                "failed to set datagram target, datagram output disabled"
            );
            self.running.store(false, Ordering::SeqCst);
            return false;
        }

        tracing::info!(target = %target, "datagram emitter started");
        *self.socket.lock().expect("socket slot poisoned") = Some(Arc::new(socket));
        true
    }

    /// Drop the socket
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.socket.lock().expect("socket slot poisoned").take();
        tracing::info!("datagram emitter stopped");
    }

    /// Send one sentence as one datagram
    ///
    /// Returns `true` only when the whole sentence left in a single
    /// datagram.
    pub async fn emit(&self, bytes: &[u8]) -> bool {
        let socket = {
            let guard = self.socket.lock().expect("socket slot poisoned");
            guard.as_ref().map(Arc::clone)
        };
        let Some(socket) = socket else {
            return false;
        };

        match socket.send(bytes).await {
            Ok(sent) if sent == bytes.len() => true,
            Ok(sent) => {
                tracing::debug!(sent, expected = bytes.len(), "short datagram send");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "datagram send failed");
                false
            }
        }
    }

    /// The configured target, parsed
    pub fn target(&self) -> Option<SocketAddr> {
        self.config.target_address().parse().ok()
    }
}

#[cfg(test)]
#[path = "udp_test.rs"]
mod udp_test;
