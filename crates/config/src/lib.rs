//! Vesselcast Configuration
//!
//! TOML-based configuration loading. The upstream credentials, bounding box
//! and output ports have no usable defaults, so a minimal config names them
//! explicitly; everything else defaults sensibly.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use vesselcast_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//!     api_key = "0123456789abcdef"
//!     stream_url = "wss://stream.example.com/v0/stream"
//!
//!     [bounding_box]
//!     north = 49.5
//!     south = 47.0
//!     east = -121.0
//!     west = -125.0
//!
//!     [network.stream]
//!     port = 10110
//! "#).unwrap();
//! assert_eq!(config.network.stream.port, 10110);
//! ```

mod error;
mod logging;
mod network;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use logging::LoggingConfig;
pub use network::{DatagramTargetConfig, NetworkConfig, StreamListenConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream provider API key; required
    pub api_key: String,

    /// Upstream websocket URL; must be `wss://`
    pub stream_url: String,

    /// Geographic subscription filter
    pub bounding_box: BoundingBox,

    /// Downstream outputs
    pub network: NetworkConfig,

    /// Logging and statistics reporting
    pub logging: LoggingConfig,
}

/// A latitude/longitude rectangle
///
/// `west > east` is the antimeridian-crossing case and is legitimate; the
/// serialized subscription order (`[[south, west], [north, east]]`) is the
/// upstream contract, this in-memory shape is not.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Default for BoundingBox {
    /// The whole globe
    fn default() -> Self {
        Self {
            north: 90.0,
            south: -90.0,
            east: 180.0,
            west: -180.0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
