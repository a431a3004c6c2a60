//! The check-in flow orchestrator.
//!
//! One scan walks the whole pipeline in order:
//!
//! 1. rate-limit admission for the calling actor
//! 2. QR token verification (signature, expiry, audience, scope)
//! 3. replay-guard claim of the token id, for its remaining validity
//! 4. registration-status gate (external collaborator, fail closed)
//! 5. idempotent durable record
//! 6. fact publication — fire-and-forget; the record is the source of
//!    truth and a failed publish must not fail the scan

use crate::error::{CheckinError, Result};
use crate::providers::{CheckinMethod, CheckinRecord, CheckinRecorder, RegistrationGate};
use chrono::Utc;
use std::sync::Arc;
use trailpass_core::{CapabilityContext, CheckinFact, FactBus, OrgId, TrailId, UserId};
use trailpass_credential::QrTokens;
use trailpass_guard::{RateLimiter, ReplayGuard};

/// Route key under which scans are rate limited.
pub const SCAN_ROUTE: &str = "checkin.scan";

/// Result of a scan or manual check-in.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The durable record (new or pre-existing).
    pub record: CheckinRecord,
    /// Whether this call created the record.
    pub created: bool,
}

/// Orchestrates the scan pipeline over its injected collaborators.
pub struct CheckinFlow {
    qr_tokens: QrTokens,
    limiter: Arc<dyn RateLimiter>,
    replay: Arc<dyn ReplayGuard>,
    gate: Arc<dyn RegistrationGate>,
    recorder: Arc<dyn CheckinRecorder>,
    bus: Arc<dyn FactBus>,
}

impl CheckinFlow {
    /// Assemble the flow from its collaborators.
    #[must_use]
    pub fn new(
        qr_tokens: QrTokens,
        limiter: Arc<dyn RateLimiter>,
        replay: Arc<dyn ReplayGuard>,
        gate: Arc<dyn RegistrationGate>,
        recorder: Arc<dyn CheckinRecorder>,
        bus: Arc<dyn FactBus>,
    ) -> Self {
        Self {
            qr_tokens,
            limiter,
            replay,
            gate,
            recorder,
            bus,
        }
    }

    /// Issue a QR token for a trail.
    ///
    /// Only an organiser (or scoped service) of the owning organisation
    /// may issue. Returns the encoded token and its expiry epoch.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Forbidden`] for callers outside the
    /// organisation, or a credential error if signing fails.
    pub fn issue_qr(
        &self,
        organiser: &CapabilityContext,
        trail_id: TrailId,
        org_id: OrgId,
    ) -> Result<(String, i64)> {
        if !organiser.can_manage_org(org_id) {
            return Err(CheckinError::Forbidden);
        }
        Ok(self.qr_tokens.issue(trail_id, org_id, organiser.subject)?)
    }

    /// Process a QR scan for the authenticated participant.
    ///
    /// # Errors
    ///
    /// Fails with the full check-in taxonomy: [`CheckinError::RateLimited`],
    /// [`CheckinError::Credential`], [`CheckinError::Replayed`],
    /// [`CheckinError::NotRegistered`], or a transient store/gate error
    /// (which fails the scan closed).
    pub async fn scan(
        &self,
        token: &str,
        participant: &CapabilityContext,
        actor_key: &str,
    ) -> Result<ScanOutcome> {
        if !self.limiter.admit(actor_key, SCAN_ROUTE).await? {
            return Err(CheckinError::RateLimited);
        }

        let claims = self.qr_tokens.verify(token)?;

        // Claim for the token's remaining validity only: once expiry
        // rejects the token on its own, the guard entry is useless.
        let ttl = claims.remaining_ttl(Utc::now());
        if !self.replay.claim(&claims.jti, ttl).await? {
            tracing::warn!(jti = %claims.jti, trail_id = %claims.trail_id, "Replayed QR token");
            return Err(CheckinError::Replayed);
        }

        if !self
            .gate
            .is_confirmed(claims.trail_id, participant.subject)
            .await?
        {
            return Err(CheckinError::NotRegistered);
        }

        let (record, created) = self
            .recorder
            .record(
                claims.trail_id,
                claims.org_id,
                participant.subject,
                CheckinMethod::Qr,
                None,
            )
            .await?;

        if created {
            self.publish(&record).await;
        }

        Ok(ScanOutcome { record, created })
    }

    /// Check a participant in by hand, as an organiser.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Forbidden`] for callers outside the
    /// organisation, or a storage error.
    pub async fn record_manual(
        &self,
        organiser: &CapabilityContext,
        trail_id: TrailId,
        org_id: OrgId,
        user_id: UserId,
    ) -> Result<ScanOutcome> {
        if !organiser.can_manage_org(org_id) {
            return Err(CheckinError::Forbidden);
        }

        let (record, created) = self
            .recorder
            .record(
                trail_id,
                org_id,
                user_id,
                CheckinMethod::Manual,
                Some(organiser.subject),
            )
            .await?;

        if created {
            self.publish(&record).await;
        }

        Ok(ScanOutcome { record, created })
    }

    /// Fire-and-forget publish: the record already committed, so a
    /// publish failure is logged and swallowed.
    async fn publish(&self, record: &CheckinRecord) {
        let fact = CheckinFact::new(
            record.trail_id,
            record.org_id,
            record.user_id,
            record.checked_at,
        );
        if let Err(e) = self.bus.publish(&fact).await {
            tracing::warn!(
                idempotency_key = %fact.idempotency_key,
                error = %e,
                "Failed to publish check-in fact"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryCheckinRecorder, StaticRegistrationGate};
    use trailpass_core::{NullFactBus, Role};
    use trailpass_credential::QrTokenConfig;
    use trailpass_guard::mocks::{InMemoryRateLimiter, InMemoryReplayGuard};
    use trailpass_guard::RateLimiterConfig;

    fn participant() -> CapabilityContext {
        CapabilityContext::new(UserId::new(), Role::Attendee, vec![])
    }

    fn organiser(org: OrgId) -> CapabilityContext {
        CapabilityContext::new(UserId::new(), Role::Organiser, vec![org])
    }

    fn flow_with(
        gate: StaticRegistrationGate,
        limiter_config: RateLimiterConfig,
    ) -> CheckinFlow {
        CheckinFlow::new(
            QrTokens::new(QrTokenConfig::new("test-secret".to_string())),
            Arc::new(InMemoryRateLimiter::new(limiter_config)),
            Arc::new(InMemoryReplayGuard::new()),
            Arc::new(gate),
            Arc::new(InMemoryCheckinRecorder::new()),
            Arc::new(NullFactBus),
        )
    }

    #[tokio::test]
    async fn scan_happy_path_creates_record() {
        let trail = TrailId::new();
        let org = OrgId::new();
        let participant = participant();
        let organiser = organiser(org);

        let flow = flow_with(
            StaticRegistrationGate::new().with_confirmed(trail, participant.subject),
            RateLimiterConfig::new(),
        );

        let (token, _) = flow.issue_qr(&organiser, trail, org).unwrap();
        let outcome = flow.scan(&token, &participant, "10.0.0.1").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.record.trail_id, trail);
        assert_eq!(outcome.record.user_id, participant.subject);
        assert_eq!(outcome.record.method, CheckinMethod::Qr);
    }

    #[tokio::test]
    async fn replayed_token_is_rejected_after_first_scan() {
        let trail = TrailId::new();
        let org = OrgId::new();
        let participant = participant();
        let organiser = organiser(org);

        let flow = flow_with(
            StaticRegistrationGate::new().with_confirmed(trail, participant.subject),
            RateLimiterConfig::new(),
        );

        let (token, _) = flow.issue_qr(&organiser, trail, org).unwrap();
        flow.scan(&token, &participant, "10.0.0.1").await.unwrap();

        let err = flow.scan(&token, &participant, "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, CheckinError::Replayed));
    }

    #[tokio::test]
    async fn second_token_same_pair_observes_existing_record() {
        let trail = TrailId::new();
        let org = OrgId::new();
        let participant = participant();
        let organiser = organiser(org);

        let flow = flow_with(
            StaticRegistrationGate::new().with_confirmed(trail, participant.subject),
            RateLimiterConfig::new(),
        );

        let (first_token, _) = flow.issue_qr(&organiser, trail, org).unwrap();
        let first = flow.scan(&first_token, &participant, "a").await.unwrap();

        // A fresh token passes the replay guard but hits the
        // uniqueness constraint.
        let (second_token, _) = flow.issue_qr(&organiser, trail, org).unwrap();
        let second = flow.scan(&second_token, &participant, "a").await.unwrap();

        assert!(!second.created);
        assert_eq!(second.record.id, first.record.id);
    }

    #[tokio::test]
    async fn unregistered_participant_is_rejected() {
        let trail = TrailId::new();
        let org = OrgId::new();
        let participant = participant();
        let organiser = organiser(org);

        let flow = flow_with(StaticRegistrationGate::new(), RateLimiterConfig::new());

        let (token, _) = flow.issue_qr(&organiser, trail, org).unwrap();
        let err = flow.scan(&token, &participant, "a").await.unwrap_err();
        assert!(matches!(err, CheckinError::NotRegistered));
    }

    #[tokio::test]
    async fn over_limit_actor_is_rejected_before_verification() {
        let flow = flow_with(
            StaticRegistrationGate::new(),
            RateLimiterConfig::new().with_max_requests(1),
        );
        let participant = participant();

        // First request burns the window; garbage token is fine since
        // the limiter rejects before verification.
        let _ = flow.scan("garbage", &participant, "1.2.3.4").await;
        let err = flow.scan("garbage", &participant, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, CheckinError::RateLimited));
    }

    #[tokio::test]
    async fn garbage_token_is_a_credential_error() {
        let flow = flow_with(StaticRegistrationGate::new(), RateLimiterConfig::new());
        let err = flow
            .scan("not-a-jwt", &participant(), "a")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::Credential(_)));
    }

    #[tokio::test]
    async fn outsider_cannot_issue_qr() {
        let flow = flow_with(StaticRegistrationGate::new(), RateLimiterConfig::new());
        let other_org = OrgId::new();
        let outsider = organiser(other_org);

        let err = flow.issue_qr(&outsider, TrailId::new(), OrgId::new()).unwrap_err();
        assert!(matches!(err, CheckinError::Forbidden));
    }

    #[tokio::test]
    async fn manual_checkin_records_the_organiser() {
        let trail = TrailId::new();
        let org = OrgId::new();
        let user = UserId::new();
        let organiser = organiser(org);

        let flow = flow_with(StaticRegistrationGate::new(), RateLimiterConfig::new());

        let outcome = flow
            .record_manual(&organiser, trail, org, user)
            .await
            .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.record.method, CheckinMethod::Manual);
        assert_eq!(outcome.record.recorded_by, Some(organiser.subject));
    }
}
