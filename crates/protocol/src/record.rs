//! Normalized vessel record
//!
//! `VesselRecord` is the intermediate between the heterogeneous provider
//! payloads and the NMEA encoder. It is created per upstream frame, consumed
//! by the encoder, and dropped; nothing persists vessel state.

use chrono::{DateTime, Utc};

/// Latitude sentinel meaning "position not available"
pub const LAT_NOT_AVAILABLE: f64 = 91.0;

/// Longitude sentinel meaning "position not available"
pub const LON_NOT_AVAILABLE: f64 = 181.0;

/// Which AIS message the record normalizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Class A position report (message type 1)
    PositionClassA,
    /// Static and voyage data (message type 5)
    StaticVoyage,
    /// Class B position report (message type 18)
    PositionClassB,
    /// Static data report, Parts A and B (message type 24)
    StaticReport,
}

impl RecordKind {
    /// AIS message type number this kind encodes as
    #[inline]
    pub fn message_type(self) -> u8 {
        match self {
            RecordKind::PositionClassA => 1,
            RecordKind::StaticVoyage => 5,
            RecordKind::PositionClassB => 18,
            RecordKind::StaticReport => 24,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "type{}", self.message_type())
    }
}

/// Normalized vessel report
///
/// Optional fields carry their AIS "not available" semantics: the encoder
/// substitutes the wire sentinel for `None` (1023 for SOG, 3600 for COG,
/// 511 for heading, 128 for ROT, 60 for the UTC timestamp). `kind`
/// determines which fields the encoder consults.
#[derive(Debug, Clone)]
pub struct VesselRecord {
    /// 30-bit transceiver identity; records with `mmsi == 0` are never emitted
    pub mmsi: u32,
    /// Message type this record normalizes
    pub kind: RecordKind,
    /// Signed decimal degrees; 91.0 means not available
    pub lat: f64,
    /// Signed decimal degrees; 181.0 means not available
    pub lon: f64,
    /// Speed over ground, knots
    pub sog: Option<f64>,
    /// Course over ground, degrees
    pub cog: Option<f64>,
    /// True heading, degrees 0..359
    pub heading: Option<u16>,
    /// Rate of turn; out-of-range values encode as the 128 wire code
    pub rot: Option<i32>,
    /// Navigational status 0..15
    pub nav_status: Option<u8>,
    /// UTC second of the position fix, 0..63
    pub timestamp_seconds: Option<u8>,
    /// High-accuracy position flag
    pub position_accuracy: bool,
    /// RAIM in use flag
    pub raim: bool,
    /// Vessel name; encoder upper-cases and pads/truncates to 20 chars
    pub vessel_name: Option<String>,
    /// Radio callsign; encoder pads/truncates to 7 chars
    pub callsign: Option<String>,
    /// AIS ship and cargo type
    pub vessel_type: Option<u8>,
    /// Wall-clock time the upstream frame was received
    pub observed_at: DateTime<Utc>,
}

impl VesselRecord {
    /// Create a record with no position and every optional field absent
    pub fn new(mmsi: u32, kind: RecordKind) -> Self {
        Self {
            mmsi,
            kind,
            lat: LAT_NOT_AVAILABLE,
            lon: LON_NOT_AVAILABLE,
            sog: None,
            cog: None,
            heading: None,
            rot: None,
            nav_status: None,
            timestamp_seconds: None,
            position_accuracy: false,
            raim: false,
            vessel_name: None,
            callsign: None,
            vessel_type: None,
            observed_at: Utc::now(),
        }
    }

    /// Whether the record carries a well-formed position
    pub fn has_position(&self) -> bool {
        self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }
}
