//! Downstream network configuration
//!
//! Both outputs carry the same sentences; either can be disabled, but
//! validation requires at least one enabled.

use serde::Deserialize;

/// Downstream output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Serve sentences to TCP stream subscribers
    pub enable_stream: bool,

    /// Emit sentences as UDP datagrams
    pub enable_datagram: bool,

    /// TCP stream server settings
    pub stream: StreamListenConfig,

    /// UDP datagram target settings
    pub datagram: DatagramTargetConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enable_stream: true,
            enable_datagram: false,
            stream: StreamListenConfig::default(),
            datagram: DatagramTargetConfig::default(),
        }
    }
}

/// TCP stream server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamListenConfig {
    /// Bind address
    pub host: String,

    /// Listen port; no default, port 0 fails validation
    pub port: u16,

    /// Maximum simultaneous subscriber connections
    pub max_connections: usize,
}

impl Default for StreamListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            max_connections: 16,
        }
    }
}

/// UDP datagram target settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatagramTargetConfig {
    /// Destination address; subnet broadcast addresses are supported
    pub host: String,

    /// Destination port; no default, port 0 fails validation
    pub port: u16,
}

impl Default for DatagramTargetConfig {
    fn default() -> Self {
        Self {
            host: "255.255.255.255".to_string(),
            port: 0,
        }
    }
}
