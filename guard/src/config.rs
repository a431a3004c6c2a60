//! Rate limiter configuration.

/// Fixed-window rate limiter configuration.
///
/// Fixed windows admit up to `2 × max_requests` across a window
/// boundary in the worst case. The window is short enough that the
/// burstiness does not matter for abuse control.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Master switch. A disabled limiter admits everything.
    pub enabled: bool,

    /// Window length in seconds.
    ///
    /// Default: 60 seconds.
    pub window_seconds: i64,

    /// Maximum admitted requests per (actor, route) per window.
    ///
    /// Default: 60.
    pub max_requests: i64,
}

impl RateLimiterConfig {
    /// Create a configuration with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: true,
            window_seconds: 60,
            max_requests: 60,
        }
    }

    /// Enable or disable the limiter.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the window length.
    #[must_use]
    pub const fn with_window_seconds(mut self, seconds: i64) -> Self {
        self.window_seconds = seconds;
        self
    }

    /// Set the per-window maximum.
    #[must_use]
    pub const fn with_max_requests(mut self, max: i64) -> Self {
        self.max_requests = max;
        self
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = RateLimiterConfig::new()
            .with_window_seconds(10)
            .with_max_requests(3)
            .with_enabled(false);
        assert_eq!(config.window_seconds, 10);
        assert_eq!(config.max_requests, 3);
        assert!(!config.enabled);
    }
}
