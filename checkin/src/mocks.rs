//! In-memory doubles for flow tests.

use crate::error::Result;
use crate::providers::{
    CheckinMethod, CheckinRecord, CheckinRecorder, RegistrationGate,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use trailpass_core::{OrgId, TrailId, UserId};
use uuid::Uuid;

/// Recorder keeping records in a map keyed by (trail, participant).
#[derive(Default)]
pub struct InMemoryCheckinRecorder {
    records: Mutex<HashMap<(TrailId, UserId), CheckinRecord>>,
}

impl InMemoryCheckinRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    ///
    /// # Panics
    ///
    /// Panics if the interior mutex was poisoned by a previous panic.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether no records are held.
    ///
    /// # Panics
    ///
    /// Panics if the interior mutex was poisoned by a previous panic.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CheckinRecorder for InMemoryCheckinRecorder {
    fn record<'a>(
        &'a self,
        trail_id: TrailId,
        org_id: OrgId,
        user_id: UserId,
        method: CheckinMethod,
        recorded_by: Option<UserId>,
    ) -> Pin<Box<dyn Future<Output = Result<(CheckinRecord, bool)>> + Send + 'a>> {
        Box::pin(async move {
            #[allow(clippy::unwrap_used)] // Mutex poisoning only happens after a test panic
            let mut records = self.records.lock().unwrap();
            if let Some(existing) = records.get(&(trail_id, user_id)) {
                return Ok((existing.clone(), false));
            }
            let record = CheckinRecord {
                id: Uuid::new_v4(),
                trail_id,
                org_id,
                user_id,
                method,
                checked_at: Utc::now(),
                recorded_by,
            };
            records.insert((trail_id, user_id), record.clone());
            Ok((record, true))
        })
    }
}

/// Gate answering from a fixed set of confirmed registrations.
#[derive(Default)]
pub struct StaticRegistrationGate {
    confirmed: HashSet<(TrailId, UserId)>,
}

impl StaticRegistrationGate {
    /// Create a gate that confirms nobody.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a registration as confirmed.
    #[must_use]
    pub fn with_confirmed(mut self, trail_id: TrailId, user_id: UserId) -> Self {
        self.confirmed.insert((trail_id, user_id));
        self
    }
}

impl RegistrationGate for StaticRegistrationGate {
    fn is_confirmed<'a>(
        &'a self,
        trail_id: TrailId,
        user_id: UserId,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move { Ok(self.confirmed.contains(&(trail_id, user_id))) })
    }
}
