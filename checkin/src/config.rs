//! Check-in configuration.

use std::time::Duration;

/// Registration-status collaborator configuration.
#[derive(Debug, Clone)]
pub struct RegistrationGateConfig {
    /// Base URL of the registration service.
    pub base_url: String,

    /// Outbound request timeout. On timeout the check-in fails closed.
    ///
    /// Default: 5 seconds.
    pub request_timeout: Duration,
}

impl RegistrationGateConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Configuration for the HTTP award fallback.
#[derive(Debug, Clone)]
pub struct AwardFallbackConfig {
    /// Base URL of the points service.
    pub base_url: String,

    /// Outbound request timeout. A timed-out award is logged and
    /// dropped by the flow, like any failed publish.
    ///
    /// Default: 5 seconds.
    pub request_timeout: Duration,
}

impl AwardFallbackConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
