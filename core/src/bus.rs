//! Bus abstraction for check-in facts.
//!
//! The bus provides at-least-once delivery. Publishers treat it as
//! fire-and-forget on the request path (a failed publish is logged,
//! never surfaced to the caller whose check-in already committed), and
//! consumers must be idempotent with respect to the fact's
//! idempotency key.
//!
//! Implementations:
//! - `trailpass-relay::KafkaFactBus` for production
//! - `trailpass-checkin::HttpAwardFallback` for relay-less
//!   deployments, posting awards straight to the points service
//! - [`NullFactBus`] for tests

use crate::fact::CheckinFact;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while talking to the bus.
#[derive(Debug, Error, Clone)]
pub enum FactBusError {
    /// Failed to reach or configure the bus.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Failed to publish a fact to a topic.
    #[error("Publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// The topic that failed.
        topic: String,
        /// The reason for failure.
        reason: String,
    },

    /// Failed to subscribe to a topic.
    #[error("Subscription failed for topic '{topic}': {reason}")]
    SubscriptionFailed {
        /// The topic that failed.
        topic: String,
        /// The reason for failure.
        reason: String,
    },

    /// A delivered payload could not be decoded as a check-in fact.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Network or transport error.
    #[error("Transport error: {0}")]
    TransportError(String),
}

/// Publisher side of the check-in fact bus.
///
/// All implementations must be `Send + Sync`; the flow orchestrator
/// shares one behind an `Arc`.
pub trait FactBus: Send + Sync {
    /// Publish a fact.
    ///
    /// Delivery is at-least-once; the same logical fact may reach a
    /// consumer more than once and carries the same idempotency key
    /// each time.
    fn publish(
        &self,
        fact: &CheckinFact,
    ) -> Pin<Box<dyn Future<Output = Result<(), FactBusError>> + Send + '_>>;
}

/// A bus that drops every fact.
///
/// Used in unit tests that don't care about publication.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFactBus;

impl FactBus for NullFactBus {
    fn publish(
        &self,
        _fact: &CheckinFact,
    ) -> Pin<Box<dyn Future<Output = Result<(), FactBusError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn null_bus_accepts_everything() {
        let bus = NullFactBus;
        let fact = CheckinFact::new(
            crate::ids::TrailId::new(),
            crate::ids::OrgId::new(),
            crate::ids::UserId::new(),
            chrono::Utc::now(),
        );
        tokio_test::block_on(bus.publish(&fact)).expect("null bus never fails");
    }

    #[test]
    fn fact_bus_is_object_safe() {
        fn assert_dyn(_bus: &dyn FactBus) {}
        assert_dyn(&NullFactBus);
    }
}
