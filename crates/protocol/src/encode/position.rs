//! Position report payloads (types 1 and 18)

use crate::bits::BitBuffer;
use crate::record::VesselRecord;

use super::{cog_raw, heading_raw, lat_raw, lon_raw, rot_raw, sog_raw};

/// Class A position report, message type 1, 168 bits
pub(super) fn build_type1(record: &VesselRecord) -> BitBuffer {
    let mut bits = BitBuffer::new(168);

    bits.set_u32(0, 6, 1);
    bits.set_u32(6, 2, 0); // repeat indicator
    bits.set_u32(8, 30, record.mmsi);
    bits.set_u32(38, 4, u32::from(record.nav_status.unwrap_or(0).min(15)));
    bits.set_u32(42, 8, rot_raw(record.rot));
    bits.set_u32(50, 10, sog_raw(record.sog));
    bits.set_u32(60, 1, u32::from(record.position_accuracy));
    bits.set_i32(61, 28, lon_raw(record.lon));
    bits.set_i32(89, 27, lat_raw(record.lat));
    bits.set_u32(116, 12, cog_raw(record.cog));
    bits.set_u32(128, 9, heading_raw(record.heading));
    bits.set_u32(137, 6, u32::from(record.timestamp_seconds.unwrap_or(60).min(63)));
    bits.set_u32(143, 2, 0); // maneuver indicator
    bits.set_u32(145, 3, 0); // spare
    bits.set_u32(148, 1, u32::from(record.raim));
    bits.set_u32(149, 19, 0); // radio status

    bits
}

/// Class B position report, message type 18, 168 bits
///
/// The Class B flag block advertises a SOTDMA unit with DSC, whole-band and
/// message-22 capability, matching what the upstream transceivers report.
pub(super) fn build_type18(record: &VesselRecord) -> BitBuffer {
    let mut bits = BitBuffer::new(168);

    bits.set_u32(0, 6, 18);
    bits.set_u32(6, 2, 0); // repeat indicator
    bits.set_u32(8, 30, record.mmsi);
    bits.set_u32(38, 8, 0); // reserved
    bits.set_u32(46, 10, sog_raw(record.sog));
    bits.set_u32(56, 1, u32::from(record.position_accuracy));
    bits.set_i32(57, 28, lon_raw(record.lon));
    bits.set_i32(85, 27, lat_raw(record.lat));
    bits.set_u32(112, 12, cog_raw(record.cog));
    bits.set_u32(124, 9, heading_raw(record.heading));
    bits.set_u32(133, 6, u32::from(record.timestamp_seconds.unwrap_or(60).min(63)));
    bits.set_u32(139, 2, 0); // regional reserved
    bits.set_u32(141, 1, 1); // CS unit
    bits.set_u32(142, 1, 0); // no display
    bits.set_u32(143, 1, 1); // DSC capable
    bits.set_u32(144, 1, 1); // whole band
    bits.set_u32(145, 1, 1); // accepts message 22
    bits.set_u32(146, 1, 0); // not assigned mode
    bits.set_u32(147, 1, u32::from(record.raim));
    bits.set_u32(148, 1, 1); // comm state selector
    bits.set_u32(149, 19, 0); // comm state

    bits
}
