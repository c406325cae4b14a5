//! Vesselcast Pipeline
//!
//! The service controller: owns the upstream client, both sinks and the
//! statistics counters, and moves records through
//! decode -> encode -> CRLF -> concurrent fan-out.
//!
//! ```text
//! [UpstreamClient] --RecordEvent--> [Controller] --+--> [BroadcastServer]
//!                                                  +--> [DatagramEmitter]
//! ```

mod controller;

pub use controller::{Controller, ControllerStatus};
