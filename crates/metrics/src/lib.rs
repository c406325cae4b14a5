//! Vesselcast Metrics
//!
//! Monotonic counters for the bridge and a periodic summary reporter.
//!
//! # Design
//!
//! One `BridgeMetrics` set exists per process, created by the controller and
//! shared as `Arc<BridgeMetrics>` with the upstream client and the reporter.
//! Counters are relaxed atomics: they are statistics, not synchronization,
//! and they never reset while the process is alive. `snapshot()` gives a
//! point-in-time copy for reporting and status queries.

mod reporter;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub use reporter::MetricsReporter;

/// Monotonic counter set for the whole bridge
#[derive(Debug)]
pub struct BridgeMetrics {
    /// Upstream frames that decoded into a record
    records_received: AtomicU64,

    /// Records the encoder turned into at least one sentence
    records_converted: AtomicU64,

    /// Sentences handed to the outputs (each sentence counts once,
    /// regardless of how many peers received it)
    sentences_broadcast: AtomicU64,

    /// Per-frame decode failures (recoverable, frame skipped)
    decode_errors: AtomicU64,

    /// Upstream transport failures (each triggers a reconnect)
    transport_errors: AtomicU64,

    /// Records the encoder skipped (zero MMSI)
    encoder_skips: AtomicU64,

    /// Writes to a stream peer that failed and evicted the peer
    peer_write_errors: AtomicU64,

    /// Records dropped because the record channel was full
    records_dropped: AtomicU64,

    /// Static-variant frames that arrived without metadata coordinates
    defaulted_positions: AtomicU64,

    /// Sentences per AIS message type, indexed by [`type_bucket`]
    by_type: [AtomicU64; 4],

    /// Process start, for uptime
    started: Instant,
}

/// Histogram bucket for an AIS message type number
///
/// Returns `None` for types the bridge does not emit.
fn type_bucket(message_type: u8) -> Option<usize> {
    match message_type {
        1 => Some(0),
        5 => Some(1),
        18 => Some(2),
        24 => Some(3),
        _ => None,
    }
}

impl BridgeMetrics {
    /// Create a zeroed counter set; uptime starts now
    pub fn new() -> Self {
        Self {
            records_received: AtomicU64::new(0),
            records_converted: AtomicU64::new(0),
            sentences_broadcast: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            encoder_skips: AtomicU64::new(0),
            peer_write_errors: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            defaulted_positions: AtomicU64::new(0),
            by_type: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
            started: Instant::now(),
        }
    }

    /// Record an upstream frame that decoded into a record
    #[inline]
    pub fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful conversion, bucketed by AIS message type
    #[inline]
    pub fn record_converted(&self, message_type: u8) {
        self.records_converted.fetch_add(1, Ordering::Relaxed);
        if let Some(bucket) = type_bucket(message_type) {
            self.by_type[bucket].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a sentence handed to the outputs
    #[inline]
    pub fn record_broadcast(&self) {
        self.sentences_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-frame decode failure
    #[inline]
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an upstream transport failure
    #[inline]
    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a record the encoder skipped
    #[inline]
    pub fn record_encoder_skip(&self) {
        self.encoder_skips.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evicting peer write failure
    #[inline]
    pub fn record_peer_write_error(&self) {
        self.peer_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a record dropped on channel overflow
    #[inline]
    pub fn record_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a static frame whose position was defaulted to 0.0
    #[inline]
    pub fn record_defaulted_position(&self) {
        self.defaulted_positions.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            records_converted: self.records_converted.load(Ordering::Relaxed),
            sentences_broadcast: self.sentences_broadcast.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            encoder_skips: self.encoder_skips.load(Ordering::Relaxed),
            peer_write_errors: self.peer_write_errors.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            defaulted_positions: self.defaulted_positions.load(Ordering::Relaxed),
            type1: self.by_type[0].load(Ordering::Relaxed),
            type5: self.by_type[1].load(Ordering::Relaxed),
            type18: self.by_type[2].load(Ordering::Relaxed),
            type24: self.by_type[3].load(Ordering::Relaxed),
            uptime: self.started.elapsed(),
        }
    }
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of bridge counters
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub records_converted: u64,
    pub sentences_broadcast: u64,
    pub decode_errors: u64,
    pub transport_errors: u64,
    pub encoder_skips: u64,
    pub peer_write_errors: u64,
    pub records_dropped: u64,
    pub defaulted_positions: u64,
    pub type1: u64,
    pub type5: u64,
    pub type18: u64,
    pub type24: u64,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Sum of every error-class counter
    pub fn total_errors(&self) -> u64 {
        self.decode_errors
            + self.transport_errors
            + self.encoder_skips
            + self.peer_write_errors
            + self.records_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let snapshot = BridgeMetrics::new().snapshot();
        assert_eq!(snapshot.records_received, 0);
        assert_eq!(snapshot.records_converted, 0);
        assert_eq!(snapshot.sentences_broadcast, 0);
        assert_eq!(snapshot.total_errors(), 0);
    }

    #[test]
    fn test_conversion_buckets_by_type() {
        let metrics = BridgeMetrics::new();
        metrics.record_converted(1);
        metrics.record_converted(1);
        metrics.record_converted(5);
        metrics.record_converted(18);
        metrics.record_converted(24);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_converted, 5);
        assert_eq!(snapshot.type1, 2);
        assert_eq!(snapshot.type5, 1);
        assert_eq!(snapshot.type18, 1);
        assert_eq!(snapshot.type24, 1);
    }

    #[test]
    fn test_unemitted_type_counts_total_only() {
        let metrics = BridgeMetrics::new();
        metrics.record_converted(27);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_converted, 1);
        assert_eq!(
            snapshot.type1 + snapshot.type5 + snapshot.type18 + snapshot.type24,
            0
        );
    }

    #[test]
    fn test_total_errors_sums_every_class() {
        let metrics = BridgeMetrics::new();
        metrics.record_decode_error();
        metrics.record_transport_error();
        metrics.record_encoder_skip();
        metrics.record_peer_write_error();
        metrics.record_dropped();

        assert_eq!(metrics.snapshot().total_errors(), 5);
    }

    #[test]
    fn test_uptime_is_monotonic() {
        let metrics = BridgeMetrics::new();
        let first = metrics.snapshot().uptime;
        let second = metrics.snapshot().uptime;
        assert!(second >= first);
    }
}
