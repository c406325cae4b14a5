//! Static and voyage payloads (types 5 and 24)

use crate::bits::BitBuffer;
use crate::record::VesselRecord;

use super::pack_text;

/// Vendor id reported in type 24 Part B when the provider gives none
const DEFAULT_VENDOR_ID: &str = "GENERIC";

/// EPFD type 1: GPS
const EPFD_GPS: u32 = 1;

/// Static and voyage data, message type 5, 424 bits
///
/// Fields the record does not carry use the ITU "not available" codes: IMO
/// and dimensions zero, ETA 00-00 24:60, draught zero, blank destination,
/// DTE not available.
pub(super) fn build_type5(record: &VesselRecord) -> BitBuffer {
    let mut bits = BitBuffer::new(424);

    bits.set_u32(0, 6, 5);
    bits.set_u32(6, 2, 0); // repeat indicator
    bits.set_u32(8, 30, record.mmsi);
    bits.set_u32(38, 2, 0); // AIS version
    bits.set_u32(40, 30, 0); // IMO number
    pack_text(&mut bits, 70, 7, record.callsign.as_deref().unwrap_or(""));
    pack_text(&mut bits, 112, 20, record.vessel_name.as_deref().unwrap_or(""));
    bits.set_u32(232, 8, u32::from(record.vessel_type.unwrap_or(0)));
    bits.set_u32(240, 9, 0); // dimension to bow
    bits.set_u32(249, 9, 0); // dimension to stern
    bits.set_u32(258, 6, 0); // dimension to port
    bits.set_u32(264, 6, 0); // dimension to starboard
    bits.set_u32(270, 4, EPFD_GPS);
    bits.set_u32(274, 4, 0); // ETA month
    bits.set_u32(278, 5, 0); // ETA day
    bits.set_u32(283, 5, 24); // ETA hour
    bits.set_u32(289, 6, 60); // ETA minute
    bits.set_u32(295, 8, 0); // draught
    pack_text(&mut bits, 303, 20, "");
    bits.set_u32(423, 1, 1); // DTE

    bits
}

/// Static data report Part A, message type 24, 168 bits
pub(super) fn build_type24_part_a(record: &VesselRecord) -> BitBuffer {
    let mut bits = BitBuffer::new(168);

    bits.set_u32(0, 6, 24);
    bits.set_u32(6, 2, 0); // repeat indicator
    bits.set_u32(8, 30, record.mmsi);
    bits.set_u32(38, 2, 0); // part number A
    pack_text(&mut bits, 40, 20, record.vessel_name.as_deref().unwrap_or(""));
    bits.set_u32(160, 8, 0); // spare

    bits
}

/// Static data report Part B, message type 24, 168 bits
pub(super) fn build_type24_part_b(record: &VesselRecord) -> BitBuffer {
    let mut bits = BitBuffer::new(168);

    bits.set_u32(0, 6, 24);
    bits.set_u32(6, 2, 0); // repeat indicator
    bits.set_u32(8, 30, record.mmsi);
    bits.set_u32(38, 2, 1); // part number B
    bits.set_u32(40, 8, u32::from(record.vessel_type.unwrap_or(0)));
    pack_text(&mut bits, 48, 7, DEFAULT_VENDOR_ID);
    pack_text(&mut bits, 90, 7, record.callsign.as_deref().unwrap_or(""));
    bits.set_u32(132, 9, 0); // dimension to bow
    bits.set_u32(141, 9, 0); // dimension to stern
    bits.set_u32(150, 6, 0); // dimension to port
    bits.set_u32(156, 6, 0); // dimension to starboard
    bits.set_u32(162, 4, EPFD_GPS);
    bits.set_u32(166, 2, 0); // spare

    bits
}
