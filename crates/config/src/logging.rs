//! Logging and statistics reporting configuration

use serde::Deserialize;
use std::time::Duration;

/// Default statistics summary interval in seconds
const DEFAULT_STATISTICS_INTERVAL_SECS: u64 = 30;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,

    /// Seconds between statistics summaries; must be positive
    pub statistics_interval_seconds: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            statistics_interval_seconds: DEFAULT_STATISTICS_INTERVAL_SECS,
        }
    }
}

impl LoggingConfig {
    /// The statistics interval as a `Duration`
    pub fn statistics_interval(&self) -> Duration {
        Duration::from_secs(self.statistics_interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.statistics_interval(), Duration::from_secs(30));
    }
}
