//! Rank builder configuration.

use std::time::Duration;

/// Configuration for the periodic rank rebuild.
#[derive(Debug, Clone)]
pub struct RankBuilderConfig {
    /// How often the scheduler rebuilds the current period.
    ///
    /// Default: 60 seconds. Reads also rebuild on demand, so this only
    /// bounds staleness between reads.
    pub rebuild_interval: Duration,
}

impl RankBuilderConfig {
    /// Create a configuration with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rebuild_interval: Duration::from_secs(60),
        }
    }

    /// Set the rebuild interval.
    #[must_use]
    pub const fn with_rebuild_interval(mut self, interval: Duration) -> Self {
        self.rebuild_interval = interval;
        self
    }
}

impl Default for RankBuilderConfig {
    fn default() -> Self {
        Self::new()
    }
}
