//! HTTP award fallback for relay-less deployments.
//!
//! Without a broker, the points service is awarded synchronously:
//! `POST {base}/points/ingest/checkin` with the fact as its JSON body.
//! The fallback implements [`FactBus`], so it slots into the flow in
//! place of the Kafka bus and inherits the fire-and-forget contract —
//! a failed award is logged and swallowed by the flow, never surfaced
//! to the scanner whose check-in already committed. The fact carries
//! its idempotency key, so the receiving ledger dedupes retried awards
//! the same way it dedupes redelivered facts.

use crate::config::AwardFallbackConfig;
use std::future::Future;
use std::pin::Pin;
use trailpass_core::{CheckinFact, FactBus, FactBusError};

/// Synchronous award path to the points service.
pub struct HttpAwardFallback {
    client: reqwest::Client,
    config: AwardFallbackConfig,
}

impl HttpAwardFallback {
    /// Create an award fallback.
    ///
    /// # Errors
    ///
    /// Returns [`FactBusError::ConnectionFailed`] if the HTTP client
    /// cannot be built.
    pub fn new(config: AwardFallbackConfig) -> Result<Self, FactBusError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                FactBusError::ConnectionFailed(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/points/ingest/checkin",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl FactBus for HttpAwardFallback {
    fn publish(
        &self,
        fact: &CheckinFact,
    ) -> Pin<Box<dyn Future<Output = Result<(), FactBusError>> + Send + '_>> {
        let fact = fact.clone();
        Box::pin(async move {
            let url = self.endpoint();
            let response = self
                .client
                .post(&url)
                .json(&fact)
                .send()
                .await
                .map_err(|e| FactBusError::TransportError(e.to_string()))?;

            response
                .error_for_status()
                .map_err(|e| FactBusError::PublishFailed {
                    topic: "points/ingest/checkin".to_string(),
                    reason: e.to_string(),
                })?;

            tracing::debug!(
                idempotency_key = %fact.idempotency_key,
                "Check-in awarded over HTTP fallback"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let fallback =
            HttpAwardFallback::new(AwardFallbackConfig::new("http://points:8000/")).unwrap();
        assert_eq!(fallback.endpoint(), "http://points:8000/points/ingest/checkin");
    }

    #[test]
    fn fallback_slots_in_as_a_fact_bus() {
        let fallback =
            HttpAwardFallback::new(AwardFallbackConfig::new("http://points:8000")).unwrap();
        let _bus: Arc<dyn FactBus> = Arc::new(fallback);
    }
}
