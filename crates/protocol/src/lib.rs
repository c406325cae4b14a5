//! Vesselcast Protocol - AIS payloads and NMEA-0183 sentences
//!
//! This crate is the pure, CPU-bound core of the bridge:
//! - `BitBuffer` - fixed-width bit packing and 6-bit ASCII armoring
//! - `VesselRecord` - the normalized intermediate between provider frames
//!   and the encoder
//! - `NmeaEncoder` - bit-exact payload builders for AIS types 1/5/18/24 and
//!   `!AIVDM` sentence framing with XOR checksums
//! - `decode` - provider JSON frames into vessel records
//!
//! Nothing here suspends: decoding, packing and armoring are plain
//! functions the async layers call inline.

mod bits;
mod decode;
mod encode;
mod error;
mod record;
mod sentence;

pub use bits::{checksum, BitBuffer};
pub use decode::{decode, Decoded};
pub use encode::NmeaEncoder;
pub use error::{DecodeError, ProtocolError};
pub use record::{RecordKind, VesselRecord, LAT_NOT_AVAILABLE, LON_NOT_AVAILABLE};
pub use sentence::{NmeaSentence, MAX_SENTENCE_LEN, TALKER_ID};
