//! NMEA encoder for AIS message types 1, 5, 18 and 24
//!
//! `NmeaEncoder` turns a [`VesselRecord`] into one or more framed `!AIVDM`
//! fragments. Types 1 and 18 always fit one fragment; type 24 emits Part A
//! on channel A then Part B on channel B; type 5 is a 424-bit payload split
//! across fragments sharing a message id.
//!
//! # Bit layouts
//!
//! Field positions live in `position.rs` (types 1/18) and `static_data.rs`
//! (types 5/24), expressed as `set_u32(offset, width, value)` calls against
//! the fixed-size [`BitBuffer`]. All layouts are big-endian per ITU-R M.1371.
//!
//! # Failure semantics
//!
//! Encoding cannot fail: a record with `mmsi == 0` yields an empty list and
//! the caller counts the skip. Out-of-range numerics are clamped or replaced
//! with the field's "not available" wire code before packing.

mod position;
mod static_data;

use crate::bits::BitBuffer;
use crate::record::{RecordKind, VesselRecord};
use crate::sentence::{NmeaSentence, MAX_SENTENCE_LEN};

use position::{build_type1, build_type18};
use static_data::{build_type5, build_type24_part_a, build_type24_part_b};

/// Envelope overhead of a fragment, excluding payload and message id:
/// `!AIVDM,` + count + `,` + num + `,` + `,` + channel + `,` + `,` + fill +
/// `*HH` + CRLF.
const FRAGMENT_OVERHEAD: usize = 21;

/// Stateful sentence builder
///
/// The only state is the fragment-correlation counter for multi-fragment
/// messages, drawn modulo 10.
#[derive(Debug, Default)]
pub struct NmeaEncoder {
    next_message_id: u8,
}

impl NmeaEncoder {
    /// Create an encoder with the message-id counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a record into framed sentences
    ///
    /// Returns one sentence for types 1 and 18, two for type 24 (Part A then
    /// Part B), and as many fragments as the 424-bit payload needs for type
    /// 5. Records with `mmsi == 0` yield an empty list.
    pub fn encode(&mut self, record: &VesselRecord) -> Vec<NmeaSentence> {
        if record.mmsi == 0 {
            return Vec::new();
        }

        match record.kind {
            RecordKind::PositionClassA => self.frame(build_type1(record), 'A'),
            RecordKind::PositionClassB => self.frame(build_type18(record), 'A'),
            RecordKind::StaticVoyage => self.frame(build_type5(record), 'A'),
            RecordKind::StaticReport => {
                let mut sentences = self.frame(build_type24_part_a(record), 'A');
                sentences.extend(self.frame(build_type24_part_b(record), 'B'));
                sentences
            }
        }
    }

    /// Armor a payload and split it into `!AIVDM` fragments
    fn frame(&mut self, bits: BitBuffer, channel: char) -> Vec<NmeaSentence> {
        let payload = bits.armor();
        let fill_bits = bits.fill_bits();

        // Single fragment: empty message id field.
        if payload.len() <= MAX_SENTENCE_LEN - FRAGMENT_OVERHEAD {
            return vec![NmeaSentence::new(1, 1, None, channel, payload, fill_bits)];
        }

        let message_id = self.next_message_id;
        self.next_message_id = (self.next_message_id + 1) % 10;

        // The message id is a single digit, so each fragment's data field may
        // carry up to 82 - 21 - 1 = 60 armored characters.
        let capacity = MAX_SENTENCE_LEN - FRAGMENT_OVERHEAD - 1;
        let chunks: Vec<&str> = payload
            .as_bytes()
            .chunks(capacity)
            .map(|c| std::str::from_utf8(c).expect("armored payload is ASCII"))
            .collect();
        debug_assert!(chunks.len() <= 9, "fragment count exceeds NMEA limit");

        let count = chunks.len() as u8;
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let last = i + 1 == chunks.len();
                NmeaSentence::new(
                    count,
                    (i + 1) as u8,
                    Some(message_id),
                    channel,
                    chunk.to_string(),
                    if last { fill_bits } else { 0 },
                )
            })
            .collect()
    }
}

// =============================================================================
// Field conversions shared by the message builders
// =============================================================================

/// Latitude "not available" raw value (91 degrees in 1/600000 minutes-of-arc units)
const LAT_RAW_NOT_AVAILABLE: i32 = 54_600_000;

/// Longitude "not available" raw value (181 degrees)
const LON_RAW_NOT_AVAILABLE: i32 = 108_600_000;

/// Scale degrees into the 1/600000-degree raw unit
const COORD_SCALE: f64 = 600_000.0;

fn lat_raw(lat: f64) -> i32 {
    if lat.is_nan() || lat.abs() > 90.0 {
        return LAT_RAW_NOT_AVAILABLE;
    }
    ((lat * COORD_SCALE).round() as i64).clamp(-54_000_000, 54_000_000) as i32
}

fn lon_raw(lon: f64) -> i32 {
    if lon.is_nan() || lon.abs() > 180.0 {
        return LON_RAW_NOT_AVAILABLE;
    }
    ((lon * COORD_SCALE).round() as i64).clamp(-108_000_000, 108_000_000) as i32
}

fn sog_raw(sog: Option<f64>) -> u32 {
    match sog {
        Some(s) if !s.is_nan() && s < 102.3 => ((s * 10.0).round() as i64).clamp(0, 1023) as u32,
        _ => 1023,
    }
}

fn cog_raw(cog: Option<f64>) -> u32 {
    match cog {
        Some(c) if !c.is_nan() && (0.0..360.0).contains(&c) => (c * 10.0).round() as u32,
        _ => 3600,
    }
}

fn heading_raw(heading: Option<u16>) -> u32 {
    match heading {
        Some(h) if h <= 359 => u32::from(h),
        _ => 511,
    }
}

/// Rate-of-turn wire code
///
/// Any absent or out-of-range value encodes as 128; in-range values encode
/// as their two's-complement byte.
fn rot_raw(rot: Option<i32>) -> u32 {
    match rot {
        Some(r) if (-127..=127).contains(&r) => u32::from(r as u8),
        _ => 128,
    }
}

/// The 6-bit text alphabet, applied literally for wire compatibility
///
/// Characters outside the table encode as 0.
fn sixbit_char(ch: char) -> u32 {
    match ch {
        '@' => 0,
        'A'..='Z' => ch as u32 - 64,
        ' ' => 32,
        '0'..='9' => ch as u32 - 48 + 16,
        _ => 0,
    }
}

/// Pack `text` into `char_count` consecutive 6-bit fields at `offset`
///
/// The text is upper-cased, truncated to `char_count`, and right-padded with
/// spaces.
fn pack_text(bits: &mut BitBuffer, offset: usize, char_count: usize, text: &str) {
    let upper = text.to_ascii_uppercase();
    let mut chars = upper.chars();
    for i in 0..char_count {
        let ch = chars.next().unwrap_or(' ');
        bits.set_u32(offset + i * 6, 6, sixbit_char(ch));
    }
}
