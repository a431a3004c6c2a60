//! Recorder and gate traits, and the record types they speak.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use trailpass_core::{OrgId, TrailId, UserId};
use uuid::Uuid;

/// How a check-in was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinMethod {
    /// Participant scanned the organiser's QR.
    Qr,
    /// Organiser checked the participant in by hand.
    Manual,
}

impl CheckinMethod {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Manual => "manual",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "qr" => Some(Self::Qr),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// A durably recorded check-in. Never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRecord {
    /// Row id.
    pub id: Uuid,
    /// The trail checked into.
    pub trail_id: TrailId,
    /// The organisation owning the trail.
    pub org_id: OrgId,
    /// The participant.
    pub user_id: UserId,
    /// How the check-in was taken.
    pub method: CheckinMethod,
    /// When the record was created.
    pub checked_at: DateTime<Utc>,
    /// The organiser who recorded it, for manual check-ins.
    pub recorded_by: Option<UserId>,
}

/// Durable, idempotent check-in recording.
///
/// `record` returns the record together with a `created` flag: under
/// concurrent or replayed calls for the same (trail, participant),
/// exactly one call observes `created = true` and every call returns
/// the same record. The storage uniqueness constraint is the sole
/// arbiter; implementations must never check-then-insert.
pub trait CheckinRecorder: Send + Sync {
    /// Record a check-in, or observe the pre-existing one.
    fn record<'a>(
        &'a self,
        trail_id: TrailId,
        org_id: OrgId,
        user_id: UserId,
        method: CheckinMethod,
        recorded_by: Option<UserId>,
    ) -> Pin<Box<dyn Future<Output = Result<(CheckinRecord, bool)>> + Send + 'a>>;
}

/// Answers "does this participant hold a confirmed registration for
/// this trail". An unreachable or erroring gate fails closed.
pub trait RegistrationGate: Send + Sync {
    /// `true` iff the registration exists and its status is confirmed.
    fn is_confirmed<'a>(
        &'a self,
        trail_id: TrailId,
        user_id: UserId,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;
}
