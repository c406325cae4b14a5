use super::*;

const MINIMAL: &str = r#"
api_key = "0123456789abcdef"
stream_url = "wss://stream.example.com/v0/stream"

[bounding_box]
north = 49.5
south = 47.0
east = -121.0
west = -125.0

[network.stream]
port = 10110
"#;

fn with_line(extra: &str) -> String {
    format!("{MINIMAL}\n{extra}")
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_minimal_config_parses() {
    let config = Config::from_str(MINIMAL).unwrap();
    assert_eq!(config.api_key, "0123456789abcdef");
    assert_eq!(config.stream_url, "wss://stream.example.com/v0/stream");
    assert_eq!(config.bounding_box.north, 49.5);
    assert_eq!(config.bounding_box.west, -125.0);
    assert!(config.network.enable_stream);
    assert!(!config.network.enable_datagram);
    assert_eq!(config.network.stream.host, "0.0.0.0");
    assert_eq!(config.network.stream.port, 10110);
    assert_eq!(config.network.stream.max_connections, 16);
    assert_eq!(config.logging.statistics_interval_seconds, 30);
}

#[test]
fn test_full_config_parses() {
    let config = Config::from_str(
        r#"
        api_key = "k"
        stream_url = "wss://stream.example.com/v0/stream"

        [bounding_box]
        north = 49.5
        south = 47.0
        east = -121.0
        west = -125.0

        [network]
        enable_stream = true
        enable_datagram = true

        [network.stream]
        host = "127.0.0.1"
        port = 2000
        max_connections = 4

        [network.datagram]
        host = "192.168.1.255"
        port = 2001

        [logging]
        level = "debug"
        statistics_interval_seconds = 10
        "#,
    )
    .unwrap();

    assert!(config.network.enable_datagram);
    assert_eq!(config.network.datagram.host, "192.168.1.255");
    assert_eq!(config.network.datagram.port, 2001);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.statistics_interval(),
        std::time::Duration::from_secs(10)
    );
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    assert!(matches!(
        Config::from_str("api_key = "),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = Config::from_file("/nonexistent/vesselcast.toml").unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }));
    assert!(err.to_string().contains("/nonexistent/vesselcast.toml"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_empty_api_key_rejected() {
    let bad = MINIMAL.replace("api_key = \"0123456789abcdef\"", "api_key = \" \"");
    assert!(matches!(
        Config::from_str(&bad),
        Err(ConfigError::MissingField { field: "api_key" })
    ));
}

#[test]
fn test_insecure_stream_url_rejected() {
    let bad = MINIMAL.replace("wss://", "ws://");
    let err = Config::from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("wss://"));
}

#[test]
fn test_missing_stream_url_rejected() {
    let bad = MINIMAL.replace(
        "stream_url = \"wss://stream.example.com/v0/stream\"",
        "stream_url = \"\"",
    );
    assert!(matches!(
        Config::from_str(&bad),
        Err(ConfigError::MissingField { field: "stream_url" })
    ));
}

#[test]
fn test_inverted_bounding_box_rejected() {
    let bad = MINIMAL
        .replace("north = 49.5", "north = 40.0")
        .replace("south = 47.0", "south = 45.0");
    let err = Config::from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("south"));
}

#[test]
fn test_antimeridian_wrap_is_accepted() {
    // west > east wraps the antimeridian
    let wrapped = MINIMAL
        .replace("east = -121.0", "east = -179.0")
        .replace("west = -125.0", "west = 179.0");
    assert!(Config::from_str(&wrapped).is_ok());
}

#[test]
fn test_out_of_range_latitude_rejected() {
    let bad = MINIMAL.replace("north = 49.5", "north = 95.0");
    assert!(Config::from_str(&bad).is_err());
}

#[test]
fn test_no_outputs_enabled_rejected() {
    let bad = r#"
        api_key = "k"
        stream_url = "wss://stream.example.com/v0/stream"

        [bounding_box]
        north = 49.5
        south = 47.0

        [network]
        enable_stream = false
        enable_datagram = false
    "#;
    assert!(matches!(
        Config::from_str(bad),
        Err(ConfigError::NoOutputsEnabled)
    ));
}

#[test]
fn test_stream_port_required_when_enabled() {
    let bad = MINIMAL.replace("port = 10110", "port = 0");
    let err = Config::from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("network.stream.port"));
}

#[test]
fn test_datagram_port_required_when_enabled() {
    let bad = r#"
        api_key = "k"
        stream_url = "wss://stream.example.com/v0/stream"

        [bounding_box]
        north = 49.5
        south = 47.0

        [network]
        enable_stream = false
        enable_datagram = true
    "#;
    let err = Config::from_str(bad).unwrap_err();
    assert!(err.to_string().contains("network.datagram.port"));
}

#[test]
fn test_zero_max_connections_rejected() {
    let bad = r#"
        api_key = "k"
        stream_url = "wss://stream.example.com/v0/stream"

        [bounding_box]
        north = 49.5
        south = 47.0

        [network.stream]
        port = 10110
        max_connections = 0
    "#;
    let err = Config::from_str(bad).unwrap_err();
    assert!(err.to_string().contains("max_connections"));
}

#[test]
fn test_zero_statistics_interval_rejected() {
    let bad = with_line("[logging]\nstatistics_interval_seconds = 0");
    let err = Config::from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("statistics_interval_seconds"));
}
