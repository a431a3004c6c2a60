//! Credential configuration.
//!
//! Every token family gets an explicitly constructed config object.
//! Nothing here reads the environment; the application wires values in.

use std::time::Duration;

/// QR check-in token configuration (HS256).
#[derive(Debug, Clone)]
pub struct QrTokenConfig {
    /// Shared secret for HS256 signing and verification.
    pub secret: String,

    /// Token time-to-live in seconds.
    ///
    /// Default: 120 seconds. The replay-guard TTL is derived from the
    /// token's remaining validity, so keeping this short also bounds
    /// guard-store growth.
    pub ttl_seconds: i64,
}

impl QrTokenConfig {
    /// Create a QR token configuration with the default TTL.
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self {
            secret,
            ttl_seconds: 120,
        }
    }

    /// Set the token time-to-live.
    #[must_use]
    pub const fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }
}

/// Invite token configuration (HS256).
#[derive(Debug, Clone)]
pub struct InviteTokenConfig {
    /// Shared secret for HS256 signing and verification.
    pub secret: String,

    /// Token time-to-live in hours.
    ///
    /// Default: 72 hours.
    pub ttl_hours: i64,
}

impl InviteTokenConfig {
    /// Create an invite token configuration with the default TTL.
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self {
            secret,
            ttl_hours: 72,
        }
    }

    /// Set the token time-to-live.
    #[must_use]
    pub const fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl_hours = hours;
        self
    }
}

/// Identity (access) token issuance configuration (RS256).
#[derive(Debug, Clone)]
pub struct IdentityIssuerConfig {
    /// RSA private key, PEM encoded.
    pub private_key_pem: String,

    /// Issuer name embedded in tokens and used as the JWKS `kid`.
    ///
    /// Default: `authentication-svc`.
    pub issuer: String,

    /// Access token expiry in minutes.
    ///
    /// Default: 30 minutes.
    pub expires_minutes: i64,
}

impl IdentityIssuerConfig {
    /// Create an issuer configuration with defaults.
    #[must_use]
    pub fn new(private_key_pem: String) -> Self {
        Self {
            private_key_pem,
            issuer: "authentication-svc".to_string(),
            expires_minutes: 30,
        }
    }

    /// Set the issuer name.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the access token expiry.
    #[must_use]
    pub const fn with_expires_minutes(mut self, minutes: i64) -> Self {
        self.expires_minutes = minutes;
        self
    }
}

/// JWKS client configuration for identity token verification.
#[derive(Debug, Clone)]
pub struct JwksClientConfig {
    /// URL of the published key set.
    pub jwks_url: String,

    /// Expected token issuer.
    pub issuer: String,

    /// How long a fetched key set stays fresh before a refetch.
    ///
    /// Default: 1 hour (bounded staleness).
    pub refresh_ttl: Duration,

    /// Outbound request timeout. Verification fails closed when the
    /// fetch exceeds this bound.
    ///
    /// Default: 5 seconds.
    pub request_timeout: Duration,
}

impl JwksClientConfig {
    /// Create a JWKS client configuration with default TTLs.
    #[must_use]
    pub fn new(jwks_url: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            issuer: issuer.into(),
            refresh_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Set the key set refresh TTL.
    #[must_use]
    pub const fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// Set the outbound request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_config_defaults() {
        let config = QrTokenConfig::new("secret".to_string());
        assert_eq!(config.ttl_seconds, 120);
        assert_eq!(config.with_ttl_seconds(30).ttl_seconds, 30);
    }

    #[test]
    fn invite_config_defaults() {
        let config = InviteTokenConfig::new("secret".to_string());
        assert_eq!(config.ttl_hours, 72);
    }

    #[test]
    fn jwks_config_defaults() {
        let config = JwksClientConfig::new("http://auth/jwks.json", "authentication-svc");
        assert_eq!(config.refresh_ttl, Duration::from_secs(3600));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
