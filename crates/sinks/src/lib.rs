//! Vesselcast Sinks
//!
//! Downstream outputs for encoded NMEA sentences. Both sinks receive the
//! same CRLF-terminated bytes from the controller and deliver them
//! independently; a slow or dead consumer never blocks the upstream path.
//!
//! ```text
//! [Controller] --sentence+CRLF--> [BroadcastServer] --> TCP subscribers
//!                             \-> [DatagramEmitter] --> UDP endpoint
//! ```
//!
//! | Sink | Transport | Delivery |
//! |------|-----------|----------|
//! | `tcp` | stream server | fan-out to every connected subscriber |
//! | `udp` | datagram | one datagram per sentence, fire-and-forget |

/// TCP broadcast server - fan-out to connected subscribers
pub mod tcp;

/// UDP datagram emitter - one sentence per datagram
pub mod udp;

pub use tcp::{BroadcastConfig, BroadcastServer};
pub use udp::{DatagramConfig, DatagramEmitter};
