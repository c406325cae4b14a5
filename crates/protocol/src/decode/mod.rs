//! Decoder for upstream provider frames
//!
//! Each frame is a JSON object with a `Message` holding exactly one variant
//! (`PositionReport`, `StandardClassBPositionReport`, `ShipStaticData`,
//! `ShipAndVoyageData`, `StaticDataReport`) and a top-level `MetaData` with
//! the transceiver identity and reception time. `decode` normalizes a frame
//! into a [`VesselRecord`]; frames carrying only variants this system does
//! not map come back as [`Decoded::Ignored`] rather than an error.
//!
//! When several variant keys are present the first of the priority order
//! wins: position Class A, then Class B, then static voyage, then static
//! report.
//!
//! Field coercion is strict where it matters (numeric strings fail
//! deserialization) and lenient where the encoder recovers (out-of-range
//! numerics pass through; the encoder clamps or substitutes the wire
//! sentinel).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::DecodeError;
use crate::record::{RecordKind, VesselRecord, LAT_NOT_AVAILABLE, LON_NOT_AVAILABLE};

/// Outcome of decoding one upstream frame
#[derive(Debug)]
pub enum Decoded {
    /// A normalized record, ready for the encoder
    Record {
        record: VesselRecord,
        /// A static variant arrived without metadata coordinates; the
        /// position was defaulted to 0.0 and the caller should count it
        defaulted_position: bool,
    },
    /// The frame parsed but carries no variant this system maps
    Ignored,
}

/// Decode one provider frame into a vessel record
pub fn decode(frame: &[u8]) -> Result<Decoded, DecodeError> {
    let frame: UpstreamFrame = serde_json::from_slice(frame)?;
    let meta = frame.meta_data.ok_or(DecodeError::MissingMetadata)?;
    let message = frame.message.unwrap_or_default();

    if let Some(report) = message.position_report {
        return Ok(position_record(
            &meta,
            RecordKind::PositionClassA,
            report.latitude,
            report.longitude,
            report.sog,
            report.cog,
            report.true_heading,
            report.rate_of_turn,
            report.navigational_status,
            report.timestamp,
            report.position_accuracy,
            report.raim,
        ));
    }

    if let Some(report) = message.standard_class_b_position_report {
        return Ok(position_record(
            &meta,
            RecordKind::PositionClassB,
            report.latitude,
            report.longitude,
            report.sog,
            report.cog,
            report.true_heading,
            None,
            None,
            report.timestamp,
            report.position_accuracy,
            report.raim,
        ));
    }

    if let Some(data) = message
        .ship_static_data
        .or(message.ship_and_voyage_data)
    {
        let (mut record, defaulted_position) = static_record(&meta, RecordKind::StaticVoyage);
        if let Some(name) = clean_text(data.name.as_deref()) {
            record.vessel_name = Some(name);
        }
        record.callsign = clean_text(data.call_sign.as_deref());
        record.vessel_type = data.ship_type.map(clamp_ship_type);
        return Ok(Decoded::Record {
            record,
            defaulted_position,
        });
    }

    if let Some(report) = message.static_data_report {
        let (mut record, defaulted_position) = static_record(&meta, RecordKind::StaticReport);
        if let Some(name) = report
            .report_a
            .and_then(|a| clean_text(a.name.as_deref()))
        {
            record.vessel_name = Some(name);
        }
        if let Some(part_b) = report.report_b {
            record.callsign = clean_text(part_b.call_sign.as_deref());
            record.vessel_type = part_b.ship_type.map(clamp_ship_type);
        }
        return Ok(Decoded::Record {
            record,
            defaulted_position,
        });
    }

    Ok(Decoded::Ignored)
}

/// Build a position-kind record from message-body fields
#[allow(clippy::too_many_arguments)]
fn position_record(
    meta: &MetaData,
    kind: RecordKind,
    latitude: Option<f64>,
    longitude: Option<f64>,
    sog: Option<f64>,
    cog: Option<f64>,
    heading: Option<u16>,
    rot: Option<i32>,
    nav_status: Option<u8>,
    timestamp: Option<u8>,
    accuracy: Option<bool>,
    raim: Option<bool>,
) -> Decoded {
    let mut record = VesselRecord::new(meta.mmsi.unwrap_or(0), kind);
    record.observed_at = observed_at(meta);
    record.lat = latitude.unwrap_or(LAT_NOT_AVAILABLE);
    record.lon = longitude.unwrap_or(LON_NOT_AVAILABLE);
    record.sog = sog;
    record.cog = cog;
    record.heading = heading;
    record.rot = rot;
    record.nav_status = nav_status;
    record.timestamp_seconds = timestamp;
    record.position_accuracy = accuracy.unwrap_or(false);
    record.raim = raim.unwrap_or(false);
    record.vessel_name = clean_text(meta.ship_name.as_deref());

    Decoded::Record {
        record,
        defaulted_position: false,
    }
}

/// Build a static-kind record; position comes from metadata, defaulting to
/// 0.0 (flagged) when the metadata has no coordinates
fn static_record(meta: &MetaData, kind: RecordKind) -> (VesselRecord, bool) {
    let mut record = VesselRecord::new(meta.mmsi.unwrap_or(0), kind);
    record.observed_at = observed_at(meta);
    record.vessel_name = clean_text(meta.ship_name.as_deref());

    let defaulted = meta.latitude.is_none() || meta.longitude.is_none();
    record.lat = meta.latitude.unwrap_or(0.0);
    record.lon = meta.longitude.unwrap_or(0.0);

    (record, defaulted)
}

fn observed_at(meta: &MetaData) -> DateTime<Utc> {
    meta.time_utc
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Trim provider padding; empty strings collapse to absent
fn clean_text(text: Option<&str>) -> Option<String> {
    let trimmed = text?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The provider reports ship type wider than a byte on some variants; the
/// record keeps the AIS 0..255 range
fn clamp_ship_type(ship_type: u32) -> u8 {
    ship_type.min(255) as u8
}

// =============================================================================
// Provider frame shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpstreamFrame {
    #[serde(rename = "Message")]
    message: Option<MessageBody>,
    #[serde(rename = "MetaData")]
    meta_data: Option<MetaData>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(rename = "PositionReport")]
    position_report: Option<PositionReport>,
    #[serde(rename = "StandardClassBPositionReport")]
    standard_class_b_position_report: Option<ClassBPositionReport>,
    #[serde(rename = "ShipStaticData")]
    ship_static_data: Option<StaticVoyageData>,
    #[serde(rename = "ShipAndVoyageData")]
    ship_and_voyage_data: Option<StaticVoyageData>,
    #[serde(rename = "StaticDataReport")]
    static_data_report: Option<StaticDataReport>,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    #[serde(rename = "MMSI")]
    mmsi: Option<u32>,
    #[serde(rename = "ShipName")]
    ship_name: Option<String>,
    #[serde(rename = "latitude")]
    latitude: Option<f64>,
    #[serde(rename = "longitude")]
    longitude: Option<f64>,
    #[serde(rename = "time_utc")]
    time_utc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PositionReport {
    #[serde(rename = "Latitude")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: Option<f64>,
    #[serde(rename = "Sog")]
    sog: Option<f64>,
    #[serde(rename = "Cog")]
    cog: Option<f64>,
    #[serde(rename = "TrueHeading")]
    true_heading: Option<u16>,
    #[serde(rename = "RateOfTurn")]
    rate_of_turn: Option<i32>,
    #[serde(rename = "NavigationalStatus")]
    navigational_status: Option<u8>,
    #[serde(rename = "Timestamp")]
    timestamp: Option<u8>,
    #[serde(rename = "PositionAccuracy")]
    position_accuracy: Option<bool>,
    #[serde(rename = "Raim")]
    raim: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ClassBPositionReport {
    #[serde(rename = "Latitude")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: Option<f64>,
    #[serde(rename = "Sog")]
    sog: Option<f64>,
    #[serde(rename = "Cog")]
    cog: Option<f64>,
    #[serde(rename = "TrueHeading")]
    true_heading: Option<u16>,
    #[serde(rename = "Timestamp")]
    timestamp: Option<u8>,
    #[serde(rename = "PositionAccuracy")]
    position_accuracy: Option<bool>,
    #[serde(rename = "Raim")]
    raim: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct StaticVoyageData {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "CallSign")]
    call_sign: Option<String>,
    #[serde(rename = "Type")]
    ship_type: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StaticDataReport {
    #[serde(rename = "ReportA")]
    report_a: Option<ReportPartA>,
    #[serde(rename = "ReportB")]
    report_b: Option<ReportPartB>,
}

#[derive(Debug, Deserialize)]
struct ReportPartA {
    #[serde(rename = "Name")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportPartB {
    #[serde(rename = "CallSign")]
    call_sign: Option<String>,
    #[serde(rename = "ShipType")]
    ship_type: Option<u32>,
}
