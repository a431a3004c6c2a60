//! Credential signing and verification for Trailpass.
//!
//! Three token families:
//!
//! - **QR check-in tokens** (HS256, short TTL): issued by an organiser
//!   for a trail, scanned by attendees. Audience `trail-checkin`,
//!   scope `checkin`.
//! - **Invite tokens** (HS256, long TTL): issued when inviting a
//!   participant to register. Audience `trail-invite`, scope
//!   `register`.
//! - **Identity tokens** (RS256): cross-service access tokens carrying
//!   `{sub, role, org_ids}`, verified against a published JWKS with a
//!   bounded-staleness cache.
//!
//! Symmetric tokens are issued and verified within the same trust
//! boundary, so no network call is involved. Asymmetric verification
//! may fetch the key set; the fetch fails closed on timeout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod config;
pub mod error;
pub mod identity;
pub mod jwks;
pub mod token;

pub use claims::{IdentityClaims, InviteClaims, QrClaims};
pub use config::{IdentityIssuerConfig, InviteTokenConfig, JwksClientConfig, QrTokenConfig};
pub use error::{CredentialError, Result};
pub use identity::{IdentityTokens, JwksVerifier};
pub use jwks::{build_rsa_jwk, Jwk, JwkSet};
pub use token::{InviteTokens, QrTokens};

/// Generate a fresh token identifier: 16 random bytes, URL-safe
/// unpadded base64.
#[must_use]
pub fn new_jti() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use rand::RngCore as _;

    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jti_is_unique_and_url_safe() {
        let a = new_jti();
        let b = new_jti();
        assert_ne!(a, b);
        assert_eq!(a.len(), 22); // 16 bytes, unpadded base64
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
