//! Verified claim sets.
//!
//! These are the *validated* shapes handed back to callers; raw
//! deserialization with optional fields happens inside the verifiers
//! so a missing resource claim surfaces as
//! [`CredentialError::MissingClaim`](crate::CredentialError::MissingClaim)
//! rather than a decode error.

use serde::{Deserialize, Serialize};
use trailpass_core::{CapabilityContext, OrgId, Role, TrailId, UserId};

/// Claims of a verified QR check-in token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrClaims {
    /// Unique token id, claimed once by the replay guard.
    pub jti: String,
    /// The trail this token checks into.
    pub trail_id: TrailId,
    /// The organisation owning the trail.
    pub org_id: OrgId,
    /// The organiser who generated the QR.
    pub issuer_id: UserId,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl QrClaims {
    /// Seconds of validity remaining at `now` (never negative).
    ///
    /// The replay guard claims the token id for exactly this long: a
    /// token cannot be replayed once it is independently rejected as
    /// expired.
    #[must_use]
    pub fn remaining_ttl(&self, now: chrono::DateTime<chrono::Utc>) -> i64 {
        (self.exp - now.timestamp()).max(0)
    }
}

/// Claims of a verified invite token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteClaims {
    /// Unique token id.
    pub jti: String,
    /// The trail the invite registers for.
    pub trail_id: TrailId,
    /// The organisation owning the trail.
    pub org_id: OrgId,
    /// Who issued the invite.
    pub inviter_id: UserId,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Claims of a verified identity (access) token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// The authenticated subject.
    pub sub: UserId,
    /// The subject's role.
    pub role: Role,
    /// Organisations the subject is scoped to.
    #[serde(default)]
    pub org_ids: Vec<OrgId>,
    /// Token issuer.
    pub iss: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

impl From<IdentityClaims> for CapabilityContext {
    fn from(claims: IdentityClaims) -> Self {
        Self::new(claims.sub, claims.role, claims.org_ids)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn remaining_ttl_floors_at_zero() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let claims = QrClaims {
            jti: "x".to_string(),
            trail_id: TrailId::new(),
            org_id: OrgId::new(),
            issuer_id: UserId::new(),
            iat: now.timestamp() - 120,
            exp: now.timestamp() - 10,
        };
        assert_eq!(claims.remaining_ttl(now), 0);

        let live = QrClaims {
            exp: now.timestamp() + 45,
            ..claims
        };
        assert_eq!(live.remaining_ttl(now), 45);
    }

    #[test]
    fn identity_claims_become_capability_context() {
        let sub = UserId::new();
        let org = OrgId::new();
        let claims = IdentityClaims {
            sub,
            role: Role::Organiser,
            org_ids: vec![org],
            iss: "authentication-svc".to_string(),
            exp: 0,
            jti: "j".to_string(),
        };
        let ctx: CapabilityContext = claims.into();
        assert_eq!(ctx.subject, sub);
        assert_eq!(ctx.role, Role::Organiser);
        assert!(ctx.can_manage_org(org));
    }
}
