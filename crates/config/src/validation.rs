//! Configuration validation
//!
//! Validates config consistency:
//! - Upstream credentials and URL are present, and the URL is a secure
//!   websocket scheme
//! - The bounding box is well-formed (south < north; west > east is the
//!   legitimate antimeridian-wrapping case and passes)
//! - Enabled outputs have nonzero ports
//! - At least one output is enabled
//! - The statistics interval is positive

use crate::error::{ConfigError, Result};
use crate::Config;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_upstream(config)?;
    validate_bounding_box(config)?;
    validate_network(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_upstream(config: &Config) -> Result<()> {
    if config.api_key.trim().is_empty() {
        return Err(ConfigError::missing_field("api_key"));
    }

    if config.stream_url.trim().is_empty() {
        return Err(ConfigError::missing_field("stream_url"));
    }

    if !config.stream_url.starts_with("wss://") {
        return Err(ConfigError::invalid_value(
            "stream_url",
            format!(
                "'{}' is not a secure websocket URL (wss://)",
                config.stream_url
            ),
        ));
    }

    Ok(())
}

fn validate_bounding_box(config: &Config) -> Result<()> {
    let bbox = &config.bounding_box;

    if !(-90.0..=90.0).contains(&bbox.south) || !(-90.0..=90.0).contains(&bbox.north) {
        return Err(ConfigError::invalid_value(
            "bounding_box",
            "latitudes must be within [-90, 90]",
        ));
    }

    if !(-180.0..=180.0).contains(&bbox.west) || !(-180.0..=180.0).contains(&bbox.east) {
        return Err(ConfigError::invalid_value(
            "bounding_box",
            "longitudes must be within [-180, 180]",
        ));
    }

    if bbox.south >= bbox.north {
        return Err(ConfigError::invalid_value(
            "bounding_box",
            format!("south ({}) must be below north ({})", bbox.south, bbox.north),
        ));
    }

    Ok(())
}

fn validate_network(config: &Config) -> Result<()> {
    let network = &config.network;

    if !network.enable_stream && !network.enable_datagram {
        return Err(ConfigError::NoOutputsEnabled);
    }

    if network.enable_stream && network.stream.port == 0 {
        return Err(ConfigError::invalid_value(
            "network.stream.port",
            "port is required (1..65535)",
        ));
    }

    if network.enable_datagram && network.datagram.port == 0 {
        return Err(ConfigError::invalid_value(
            "network.datagram.port",
            "port is required (1..65535)",
        ));
    }

    if network.enable_stream && network.stream.max_connections == 0 {
        return Err(ConfigError::invalid_value(
            "network.stream.max_connections",
            "must allow at least one connection",
        ));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> Result<()> {
    if config.logging.statistics_interval_seconds == 0 {
        return Err(ConfigError::invalid_value(
            "logging.statistics_interval_seconds",
            "must be positive",
        ));
    }

    Ok(())
}
