//! The check-in fact published on the bus.
//!
//! Wire format is JSON:
//!
//! ```json
//! {
//!   "trail_id": "…",
//!   "org_id": "…",
//!   "user_id": "…",
//!   "checked_at": "2026-08-29T18:00:00Z",
//!   "idempotency_key": "{trail_id}:{user_id}"
//! }
//! ```
//!
//! The idempotency key is derived, never random: re-publishing the same
//! logical fact after a crash carries the same key, so downstream
//! consumers can collapse duplicates.

use crate::ids::{OrgId, TrailId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded check-in, as delivered to downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinFact {
    /// The trail that was checked into.
    pub trail_id: TrailId,
    /// The organisation owning the trail.
    pub org_id: OrgId,
    /// The participant who checked in.
    pub user_id: UserId,
    /// When the check-in was recorded.
    pub checked_at: DateTime<Utc>,
    /// Deterministic duplicate-collapse key, `{trail_id}:{user_id}`.
    pub idempotency_key: String,
}

impl CheckinFact {
    /// Build a fact with its derived idempotency key.
    #[must_use]
    pub fn new(
        trail_id: TrailId,
        org_id: OrgId,
        user_id: UserId,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            trail_id,
            org_id,
            user_id,
            checked_at,
            idempotency_key: idempotency_key(trail_id, user_id),
        }
    }
}

/// The deterministic idempotency key for a (trail, participant) pair.
#[must_use]
pub fn idempotency_key(trail_id: TrailId, user_id: UserId) -> String {
    format!("{trail_id}:{user_id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn idempotency_key_is_deterministic() {
        let trail = TrailId::new();
        let user = UserId::new();
        assert_eq!(
            idempotency_key(trail, user),
            idempotency_key(trail, user),
        );
        assert_eq!(idempotency_key(trail, user), format!("{trail}:{user}"));
    }

    #[test]
    fn wire_shape_matches_contract() {
        let trail = TrailId::new();
        let user = UserId::new();
        let org = OrgId::new();
        let at = Utc.with_ymd_and_hms(2026, 8, 29, 18, 0, 0).unwrap();
        let fact = CheckinFact::new(trail, org, user, at);

        let value: serde_json::Value = serde_json::to_value(&fact).unwrap();
        assert_eq!(value["trail_id"], trail.to_string());
        assert_eq!(value["org_id"], org.to_string());
        assert_eq!(value["user_id"], user.to_string());
        assert_eq!(value["idempotency_key"], format!("{trail}:{user}"));
        // RFC 3339 timestamp
        assert!(value["checked_at"].as_str().unwrap().starts_with("2026-08-29T18:00:00"));
    }

    #[test]
    fn fact_round_trips_through_json() {
        let fact = CheckinFact::new(
            TrailId::new(),
            OrgId::new(),
            UserId::new(),
            Utc::now(),
        );
        let json = serde_json::to_string(&fact).unwrap();
        let back: CheckinFact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fact);
    }
}
