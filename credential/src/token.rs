//! Symmetric (HS256) single-purpose tokens: QR check-in and invite.
//!
//! Both families are issued and verified by the same service, so a
//! shared secret suffices. Verification checks signature, expiry,
//! audience, issuer and scope before any embedded resource id is
//! trusted.

use crate::claims::{InviteClaims, QrClaims};
use crate::config::{InviteTokenConfig, QrTokenConfig};
use crate::error::{CredentialError, Result};
use crate::new_jti;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use trailpass_core::{OrgId, TrailId, UserId};

/// Audience of QR check-in tokens.
pub const QR_AUDIENCE: &str = "trail-checkin";
/// Issuer of QR check-in tokens.
pub const QR_ISSUER: &str = "qr-checkin-svc";
/// Scope of QR check-in tokens.
pub const QR_SCOPE: &str = "checkin";

/// Audience of invite tokens.
pub const INVITE_AUDIENCE: &str = "trail-invite";
/// Issuer of invite tokens.
pub const INVITE_ISSUER: &str = "trails-activities-svc";
/// Scope of invite tokens.
pub const INVITE_SCOPE: &str = "register";

/// Raw claim set as it appears on the wire. Resource claims are
/// optional here so their absence maps to `MissingClaim` instead of a
/// decode failure.
#[derive(Debug, Serialize, Deserialize)]
struct RawClaims {
    aud: String,
    iss: String,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trail_id: Option<TrailId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrgId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inviter_id: Option<UserId>,
}

fn hs256_validation(audience: &str, issuer: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "aud", "iss"]);
    validation.leeway = 0;
    validation
}

fn decode_raw(token: &str, secret: &str, audience: &str, issuer: &str) -> Result<RawClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = jsonwebtoken::decode::<RawClaims>(token, &key, &hs256_validation(audience, issuer))
        .map_err(|e| CredentialError::from_jwt(&e))?;
    Ok(data.claims)
}

fn check_scope(raw: &RawClaims, expected: &str) -> Result<()> {
    match raw.scope.as_deref() {
        Some(scope) if scope == expected => Ok(()),
        Some(_) => Err(CredentialError::WrongScope),
        None => Err(CredentialError::MissingClaim("scope")),
    }
}

/// Issues and verifies QR check-in tokens.
#[derive(Debug, Clone)]
pub struct QrTokens {
    config: QrTokenConfig,
}

impl QrTokens {
    /// Create a QR token signer/verifier.
    #[must_use]
    pub const fn new(config: QrTokenConfig) -> Self {
        Self { config }
    }

    /// Issue a QR token for a trail.
    ///
    /// Returns the encoded token and its expiry as seconds since epoch.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] if signing fails.
    pub fn issue(
        &self,
        trail_id: TrailId,
        org_id: OrgId,
        issuer_id: UserId,
    ) -> Result<(String, i64)> {
        let now = Utc::now();
        let exp = (now + Duration::seconds(self.config.ttl_seconds)).timestamp();
        let claims = RawClaims {
            aud: QR_AUDIENCE.to_string(),
            iss: QR_ISSUER.to_string(),
            exp,
            iat: Some(now.timestamp()),
            jti: Some(new_jti()),
            scope: Some(QR_SCOPE.to_string()),
            trail_id: Some(trail_id),
            org_id: Some(org_id),
            issuer_id: Some(issuer_id),
            inviter_id: None,
        };
        let key = EncodingKey::from_secret(self.config.secret.as_bytes());
        let token = jsonwebtoken::encode(&Header::default(), &claims, &key)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        Ok((token, exp))
    }

    /// Verify a QR token and return its claims.
    ///
    /// # Errors
    ///
    /// Fails with the verification taxonomy of [`CredentialError`]:
    /// signature, expiry, audience, issuer, scope, then claim presence,
    /// in that order of trust.
    pub fn verify(&self, token: &str) -> Result<QrClaims> {
        let raw = decode_raw(token, &self.config.secret, QR_AUDIENCE, QR_ISSUER)?;
        check_scope(&raw, QR_SCOPE)?;
        Ok(QrClaims {
            jti: raw.jti.ok_or(CredentialError::MissingClaim("jti"))?,
            trail_id: raw.trail_id.ok_or(CredentialError::MissingClaim("trail_id"))?,
            org_id: raw.org_id.ok_or(CredentialError::MissingClaim("org_id"))?,
            issuer_id: raw
                .issuer_id
                .ok_or(CredentialError::MissingClaim("issuer_id"))?,
            iat: raw.iat.unwrap_or_default(),
            exp: raw.exp,
        })
    }
}

/// Issues and verifies invite tokens.
#[derive(Debug, Clone)]
pub struct InviteTokens {
    config: InviteTokenConfig,
}

impl InviteTokens {
    /// Create an invite token signer/verifier.
    #[must_use]
    pub const fn new(config: InviteTokenConfig) -> Self {
        Self { config }
    }

    /// Issue an invite token for a trail.
    ///
    /// Returns the encoded token and its expiry as seconds since epoch.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] if signing fails.
    pub fn issue(
        &self,
        trail_id: TrailId,
        org_id: OrgId,
        inviter_id: UserId,
    ) -> Result<(String, i64)> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.config.ttl_hours)).timestamp();
        let claims = RawClaims {
            aud: INVITE_AUDIENCE.to_string(),
            iss: INVITE_ISSUER.to_string(),
            exp,
            iat: Some(now.timestamp()),
            jti: Some(new_jti()),
            scope: Some(INVITE_SCOPE.to_string()),
            trail_id: Some(trail_id),
            org_id: Some(org_id),
            issuer_id: None,
            inviter_id: Some(inviter_id),
        };
        let key = EncodingKey::from_secret(self.config.secret.as_bytes());
        let token = jsonwebtoken::encode(&Header::default(), &claims, &key)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        Ok((token, exp))
    }

    /// Verify an invite token and return its claims.
    ///
    /// # Errors
    ///
    /// Fails with the verification taxonomy of [`CredentialError`].
    pub fn verify(&self, token: &str) -> Result<InviteClaims> {
        let raw = decode_raw(token, &self.config.secret, INVITE_AUDIENCE, INVITE_ISSUER)?;
        check_scope(&raw, INVITE_SCOPE)?;
        Ok(InviteClaims {
            jti: raw.jti.ok_or(CredentialError::MissingClaim("jti"))?,
            trail_id: raw.trail_id.ok_or(CredentialError::MissingClaim("trail_id"))?,
            org_id: raw.org_id.ok_or(CredentialError::MissingClaim("org_id"))?,
            inviter_id: raw
                .inviter_id
                .ok_or(CredentialError::MissingClaim("inviter_id"))?,
            exp: raw.exp,
        })
    }
}
