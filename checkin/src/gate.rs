//! HTTP registration-status gate.
//!
//! The registration service is a synchronous external collaborator:
//! `GET {base}/trails/{trail_id}/registrations/by-user/{user_id}`
//! returns `{"status": "…"}` or 404. Only `"confirmed"` admits the
//! check-in. Timeouts and transport failures fail closed.

use crate::config::RegistrationGateConfig;
use crate::error::{CheckinError, Result};
use crate::providers::RegistrationGate;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use trailpass_core::{TrailId, UserId};

#[derive(Deserialize)]
struct RegistrationStatus {
    status: String,
}

/// Registration gate backed by the registration service's HTTP API.
pub struct HttpRegistrationGate {
    client: reqwest::Client,
    config: RegistrationGateConfig,
}

impl HttpRegistrationGate {
    /// Create a gate.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Gate`] if the HTTP client cannot be
    /// built.
    pub fn new(config: RegistrationGateConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CheckinError::Gate(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

impl RegistrationGate for HttpRegistrationGate {
    fn is_confirmed<'a>(
        &'a self,
        trail_id: TrailId,
        user_id: UserId,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/trails/{trail_id}/registrations/by-user/{user_id}",
                self.config.base_url.trim_end_matches('/'),
            );

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| CheckinError::Gate(e.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(false);
            }
            let response = response
                .error_for_status()
                .map_err(|e| CheckinError::Gate(e.to_string()))?;

            let body: RegistrationStatus = response
                .json()
                .await
                .map_err(|e| CheckinError::Gate(format!("Malformed status response: {e}")))?;

            Ok(body.status == "confirmed")
        })
    }
}
