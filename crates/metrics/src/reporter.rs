//! Periodic statistics reporter
//!
//! Emits a one-shot summary of the bridge counters to the log sink at a
//! configured interval. Runs as its own task, collecting snapshots until
//! cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::BridgeMetrics;

/// Periodic summary reporter
pub struct MetricsReporter {
    metrics: Arc<BridgeMetrics>,
    interval: Duration,
}

impl MetricsReporter {
    /// Create a reporter over the shared counter set
    pub fn new(metrics: Arc<BridgeMetrics>, interval: Duration) -> Self {
        Self { metrics, interval }
    }

    /// Run the reporter until cancellation
    ///
    /// Spawn this as a tokio task. A final summary is emitted on shutdown so
    /// short runs still report totals.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately; skip it so
        // the first summary reflects a full period.
        ticker.tick().await;

        info!(
            interval_secs = self.interval.as_secs(),
            "statistics reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.report();
                    info!("statistics reporter shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Emit one summary
    fn report(&self) {
        let s = self.metrics.snapshot();
        info!(
            uptime_secs = s.uptime.as_secs(),
            received = s.records_received,
            converted = s.records_converted,
            broadcast = s.sentences_broadcast,
            errors = s.total_errors(),
            dropped = s.records_dropped,
            type1 = s.type1,
            type5 = s.type5,
            type18 = s.type18,
            type24 = s.type24,
            "bridge statistics"
        );
    }
}
