//! Vesselcast Sources
//!
//! The upstream side of the bridge: a websocket client that subscribes to
//! the provider with a geographic filter and turns its JSON frames into
//! [`RecordEvent`]s on a bounded channel.
//!
//! ```text
//! [Provider] --wss frames--> [UpstreamClient] --RecordEvent--> [Controller]
//! ```
//!
//! Geographic filtering happens at subscription time; nothing is filtered
//! client-side.

mod subscription;
mod upstream;

pub use subscription::subscription_frame;
pub use upstream::{
    RecordEvent, UpstreamClient, UpstreamConfig, UpstreamState, UpstreamStatus,
};
