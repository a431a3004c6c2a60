//! Kafka-compatible relay for check-in facts.
//!
//! This crate carries [`CheckinFact`]s from the check-in service to the
//! downstream consumers (points ledger, leaderboard) over any
//! Kafka-protocol broker (Redpanda, Apache Kafka, MSK, ...).
//!
//! # Delivery semantics
//!
//! **At-least-once** with manual offset commits:
//! - The producer waits for broker acknowledgement with a bounded
//!   timeout; a timeout may still have landed the message, so the
//!   caller retrying produces a duplicate rather than a loss.
//! - The consumer commits an offset only AFTER the handler returned
//!   `Ok`. A crash or handler failure before commit means redelivery.
//! - Consumers must therefore be idempotent. Every fact carries a
//!   deterministic `idempotency_key` ("{trail_id}:{user_id}") so a
//!   redelivered fact is detectable without broker cooperation.
//! - The message key is the idempotency key, so all deliveries of one
//!   logical fact land on the same partition, in order.
//!
//! # Wire format
//!
//! Facts travel as JSON objects with `trail_id`, `org_id`, `user_id`,
//! `checked_at` (RFC 3339) and `idempotency_key`. A payload that does
//! not decode is logged, counted, committed and dropped: a poison
//! message must not wedge the partition.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use trailpass_core::{CheckinFact, FactBus, FactBusError};

/// Default topic for check-in facts.
pub const CHECKINS_TOPIC: &str = "checkins.recorded";

/// How a consumer applies one fact.
///
/// Implementations must be idempotent with respect to
/// `fact.idempotency_key`: at-least-once delivery means the same fact
/// can arrive again after it was already applied.
pub trait FactHandler: Send + Sync {
    /// Apply the fact. Returning `Err` leaves the offset uncommitted
    /// so the fact is delivered again.
    fn apply<'a>(
        &'a self,
        fact: &'a CheckinFact,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}

/// Producer side: publishes check-in facts to the broker.
///
/// Implements [`FactBus`] so the check-in flow depends only on the
/// trait from `trailpass-core`.
pub struct KafkaFactBus {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl std::fmt::Debug for KafkaFactBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaFactBus")
            .field("topic", &self.topic)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl KafkaFactBus {
    /// Create a fact bus with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FactBusError::ConnectionFailed`] if the producer
    /// cannot be created.
    pub fn new(brokers: &str) -> Result<Self, FactBusError> {
        Self::builder().brokers(brokers).build()
    }

    /// Create a builder for custom configuration.
    #[must_use]
    pub fn builder() -> KafkaFactBusBuilder {
        KafkaFactBusBuilder::default()
    }

    /// The topic this bus publishes to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// Builder for [`KafkaFactBus`].
#[derive(Default)]
pub struct KafkaFactBusBuilder {
    brokers: Option<String>,
    topic: Option<String>,
    producer_acks: Option<String>,
    timeout: Option<Duration>,
}

impl KafkaFactBusBuilder {
    /// Set the broker addresses (comma-separated).
    #[must_use]
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.brokers = Some(brokers.into());
        self
    }

    /// Set the topic. Default: [`CHECKINS_TOPIC`].
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the producer acknowledgment mode: "0", "1" or "all".
    ///
    /// Default: "1".
    #[must_use]
    pub fn producer_acks(mut self, acks: impl Into<String>) -> Self {
        self.producer_acks = Some(acks.into());
        self
    }

    /// Set the producer send timeout. Default: 5 seconds.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the [`KafkaFactBus`].
    ///
    /// # Errors
    ///
    /// Returns [`FactBusError::ConnectionFailed`] if brokers are not
    /// set or the producer cannot be created.
    pub fn build(self) -> Result<KafkaFactBus, FactBusError> {
        let brokers = self
            .brokers
            .ok_or_else(|| FactBusError::ConnectionFailed("Brokers not configured".to_string()))?;
        let topic = self.topic.unwrap_or_else(|| CHECKINS_TOPIC.to_string());

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", self.producer_acks.as_deref().unwrap_or("1"))
            .create()
            .map_err(|e| {
                FactBusError::ConnectionFailed(format!("Failed to create producer: {e}"))
            })?;

        tracing::info!(
            brokers = %brokers,
            topic = %topic,
            acks = self.producer_acks.as_deref().unwrap_or("1"),
            "KafkaFactBus created"
        );

        Ok(KafkaFactBus {
            producer,
            topic,
            timeout: self.timeout.unwrap_or(Duration::from_secs(5)),
        })
    }
}

impl FactBus for KafkaFactBus {
    fn publish(
        &self,
        fact: &CheckinFact,
    ) -> Pin<Box<dyn Future<Output = Result<(), FactBusError>> + Send + '_>> {
        let fact = fact.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let payload =
                serde_json::to_vec(&fact).map_err(|e| FactBusError::PublishFailed {
                    topic: self.topic.clone(),
                    reason: format!("Failed to encode fact: {e}"),
                })?;

            // Keying by idempotency key pins all deliveries of one
            // logical fact to one partition.
            let record = FutureRecord::to(&self.topic)
                .payload(&payload)
                .key(fact.idempotency_key.as_bytes());

            match self.producer.send(record, Timeout::After(timeout)).await {
                Ok((partition, offset)) => {
                    metrics::counter!("relay.facts.published").increment(1);
                    tracing::debug!(
                        topic = %self.topic,
                        partition = partition,
                        offset = offset,
                        idempotency_key = %fact.idempotency_key,
                        "Fact published"
                    );
                    Ok(())
                }
                Err((kafka_error, _)) => {
                    tracing::error!(
                        topic = %self.topic,
                        idempotency_key = %fact.idempotency_key,
                        error = %kafka_error,
                        "Failed to publish fact"
                    );
                    Err(FactBusError::PublishFailed {
                        topic: self.topic.clone(),
                        reason: kafka_error.to_string(),
                    })
                }
            }
        })
    }
}

/// Consumer side: pulls facts from the broker and feeds a handler.
pub struct FactRelay {
    brokers: String,
    topic: String,
    consumer_group: String,
    auto_offset_reset: String,
    handler_retries: u32,
    retry_backoff: Duration,
}

impl FactRelay {
    /// Create a relay consumer.
    ///
    /// `consumer_group` gives horizontal scale-out: multiple instances
    /// in the same group share the partitions.
    #[must_use]
    pub fn new(brokers: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topic: CHECKINS_TOPIC.to_string(),
            consumer_group: consumer_group.into(),
            auto_offset_reset: "earliest".to_string(),
            handler_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Override the topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Override where a new consumer group starts reading
    /// ("earliest" or "latest"). Default: "earliest" — a freshly
    /// deployed consumer must not silently skip facts.
    #[must_use]
    pub fn with_auto_offset_reset(mut self, policy: impl Into<String>) -> Self {
        self.auto_offset_reset = policy.into();
        self
    }

    /// Override in-process handler retries before giving up on a
    /// delivery (the offset stays uncommitted either way).
    #[must_use]
    pub const fn with_handler_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.handler_retries = retries;
        self.retry_backoff = backoff;
        self
    }

    /// Run the consume loop until the stream ends or the task is
    /// cancelled.
    ///
    /// Offsets are committed only after the handler succeeds. A
    /// malformed payload is logged, counted and committed — poison
    /// messages must not block the partition. A handler that keeps
    /// failing leaves its offset uncommitted, so the fact comes back
    /// on the next rebalance or restart.
    ///
    /// # Errors
    ///
    /// Returns [`FactBusError::SubscriptionFailed`] if the consumer
    /// cannot be created or subscribed.
    pub async fn run(&self, handler: Arc<dyn FactHandler>) -> Result<(), FactBusError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.consumer_group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| FactBusError::SubscriptionFailed {
                topic: self.topic.clone(),
                reason: format!("Failed to create consumer: {e}"),
            })?;

        consumer
            .subscribe(&[self.topic.as_str()])
            .map_err(|e| FactBusError::SubscriptionFailed {
                topic: self.topic.clone(),
                reason: format!("Failed to subscribe: {e}"),
            })?;

        tracing::info!(
            topic = %self.topic,
            consumer_group = %self.consumer_group,
            auto_offset_reset = %self.auto_offset_reset,
            manual_commit = true,
            "Fact relay subscribed"
        );

        use futures::StreamExt;
        let mut stream = consumer.stream();

        while let Some(msg_result) = stream.next().await {
            let message = match msg_result {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to receive message");
                    continue;
                }
            };

            let Some(payload) = message.payload() else {
                tracing::warn!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    "Dropping message with no payload"
                );
                metrics::counter!("relay.facts.malformed").increment(1);
                Self::commit(&consumer, &message);
                continue;
            };

            let fact: CheckinFact = match serde_json::from_slice(payload) {
                Ok(fact) => fact,
                Err(e) => {
                    tracing::warn!(
                        topic = message.topic(),
                        partition = message.partition(),
                        offset = message.offset(),
                        error = %e,
                        "Dropping malformed fact payload"
                    );
                    metrics::counter!("relay.facts.malformed").increment(1);
                    Self::commit(&consumer, &message);
                    continue;
                }
            };

            if self.apply_with_retries(handler.as_ref(), &fact).await {
                metrics::counter!("relay.facts.consumed").increment(1);
                Self::commit(&consumer, &message);
            } else {
                // Leave the offset uncommitted so the fact is
                // redelivered. The handler is idempotent, so the
                // eventual retry converges.
                metrics::counter!("relay.facts.failed").increment(1);
                tracing::error!(
                    idempotency_key = %fact.idempotency_key,
                    offset = message.offset(),
                    "Handler failed; offset not committed, fact will be redelivered"
                );
            }
        }

        tracing::info!("Fact relay stream ended");
        Ok(())
    }

    async fn apply_with_retries(&self, handler: &dyn FactHandler, fact: &CheckinFact) -> bool {
        let mut attempt = 0;
        loop {
            match handler.apply(fact).await {
                Ok(()) => return true,
                Err(e) => {
                    attempt += 1;
                    if attempt > self.handler_retries {
                        return false;
                    }
                    tracing::warn!(
                        idempotency_key = %fact.idempotency_key,
                        attempt = attempt,
                        error = %e,
                        "Handler failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
            }
        }
    }

    fn commit(consumer: &StreamConsumer, message: &rdkafka::message::BorrowedMessage<'_>) {
        if let Err(e) = consumer.commit_message(message, CommitMode::Async) {
            tracing::warn!(
                topic = message.topic(),
                partition = message.partition(),
                offset = message.offset(),
                error = %e,
                "Failed to commit offset (fact may be redelivered)"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trailpass_core::{OrgId, TrailId, UserId};

    fn sample_fact() -> CheckinFact {
        CheckinFact::new(
            TrailId::new(),
            OrgId::new(),
            UserId::new(),
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn wire_payload_is_json_with_idempotency_key() {
        let fact = sample_fact();
        let bytes = serde_json::to_vec(&fact).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value["idempotency_key"].as_str().unwrap(),
            format!("{}:{}", fact.trail_id, fact.user_id)
        );
        // RFC 3339 timestamp
        assert!(value["checked_at"].as_str().unwrap().starts_with("2025-06-01T09:30:00"));
    }

    #[test]
    fn malformed_payload_does_not_decode() {
        assert!(serde_json::from_slice::<CheckinFact>(b"{\"nope\": true}").is_err());
        assert!(serde_json::from_slice::<CheckinFact>(b"not json at all").is_err());
    }

    #[test]
    fn builder_requires_brokers() {
        let err = KafkaFactBus::builder().build().unwrap_err();
        assert!(matches!(err, FactBusError::ConnectionFailed(_)));
    }

    #[test]
    fn kafka_fact_bus_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<KafkaFactBus>();
        assert_sync::<KafkaFactBus>();
        assert_send::<FactRelay>();
        assert_sync::<FactRelay>();
    }
}
