//! Upstream subscription frame
//!
//! After the websocket handshake the provider expects exactly one JSON
//! subscription frame naming the API key and the geographic filter. The
//! serialized bounding-box order is the wire contract:
//! `[[south, west], [north, east]]`.

use serde::Serialize;
use vesselcast_config::BoundingBox;

#[derive(Debug, Serialize)]
struct Subscription<'a> {
    #[serde(rename = "APIKey")]
    api_key: &'a str,
    #[serde(rename = "BoundingBoxes")]
    bounding_boxes: [[[f64; 2]; 2]; 1],
}

/// Serialize the subscription frame for a key and bounding box
pub fn subscription_frame(api_key: &str, bbox: BoundingBox) -> String {
    let subscription = Subscription {
        api_key,
        bounding_boxes: [[[bbox.south, bbox.west], [bbox.north, bbox.east]]],
    };
    serde_json::to_string(&subscription).expect("subscription frame has a static shape")
}
