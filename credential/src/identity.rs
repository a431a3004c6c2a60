//! Identity (access) tokens: RS256 issue and JWKS-backed verification.

use crate::claims::IdentityClaims;
use crate::config::{IdentityIssuerConfig, JwksClientConfig};
use crate::error::{CredentialError, Result};
use crate::jwks::JwkSet;
use crate::new_jti;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::sync::RwLock;
use trailpass_core::{CapabilityContext, OrgId, Role, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct RawIdentityClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(default)]
    org_ids: Vec<OrgId>,
    iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
}

fn rs256_validation(issuer: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    // Identity tokens carry no audience; everything else is enforced.
    validation.validate_aud = false;
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    validation.leeway = 0;
    validation
}

fn decode_identity(token: &str, key: &DecodingKey, issuer: &str) -> Result<IdentityClaims> {
    let data = jsonwebtoken::decode::<RawIdentityClaims>(token, key, &rs256_validation(issuer))
        .map_err(|e| CredentialError::from_jwt(&e))?;
    let raw = data.claims;
    Ok(IdentityClaims {
        sub: raw.sub.ok_or(CredentialError::MissingClaim("sub"))?,
        role: raw.role.ok_or(CredentialError::MissingClaim("role"))?,
        org_ids: raw.org_ids,
        iss: raw.iss,
        exp: raw.exp,
        jti: raw.jti.unwrap_or_default(),
    })
}

/// Issues identity tokens signed with the service's RSA private key.
pub struct IdentityTokens {
    config: IdentityIssuerConfig,
    encoding_key: EncodingKey,
}

impl IdentityTokens {
    /// Create an identity token issuer.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] if the PEM is not a
    /// valid RSA private key.
    pub fn new(config: IdentityIssuerConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(format!("not an RSA private key: {e}")))?;
        Ok(Self {
            config,
            encoding_key,
        })
    }

    /// Issue an access token for a subject.
    ///
    /// Returns the encoded token and its validity in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] if signing fails.
    pub fn issue(
        &self,
        subject: UserId,
        role: Role,
        org_ids: Vec<OrgId>,
    ) -> Result<(String, i64)> {
        let now = Utc::now();
        let expires_in = self.config.expires_minutes * 60;
        let claims = RawIdentityClaims {
            sub: Some(subject),
            role: Some(role),
            org_ids,
            iss: self.config.issuer.clone(),
            iat: Some(now.timestamp()),
            exp: (now + Duration::seconds(expires_in)).timestamp(),
            jti: Some(new_jti()),
        };
        let header = Header {
            alg: Algorithm::RS256,
            kid: Some(self.config.issuer.clone()),
            ..Header::default()
        };
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        Ok((token, expires_in))
    }

    /// The configured issuer name.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

enum KeySource {
    /// Fetched over HTTP with a staleness bound.
    Remote {
        client: reqwest::Client,
        cache: RwLock<Option<CachedKeys>>,
    },
    /// Fixed key set, never refreshed. Used in tests and by the
    /// issuing service verifying its own tokens.
    Static(JwkSet),
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies identity tokens against a published JWKS document.
///
/// The key set is cached with a bounded staleness window
/// ([`JwksClientConfig::refresh_ttl`], default 1 hour). A fetch that
/// fails or times out fails the verification closed; a token is never
/// accepted without a fresh-enough key.
pub struct JwksVerifier {
    config: JwksClientConfig,
    source: KeySource,
}

impl JwksVerifier {
    /// Create a verifier that fetches the key set from
    /// [`JwksClientConfig::jwks_url`].
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::KeySetUnavailable`] if the HTTP
    /// client cannot be constructed.
    pub fn new(config: JwksClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CredentialError::KeySetUnavailable(e.to_string()))?;
        Ok(Self {
            config,
            source: KeySource::Remote {
                client,
                cache: RwLock::new(None),
            },
        })
    }

    /// Create a verifier over a fixed key set (no fetching).
    #[must_use]
    pub const fn with_static_keys(config: JwksClientConfig, keys: JwkSet) -> Self {
        Self {
            config,
            source: KeySource::Static(keys),
        }
    }

    async fn key_set(&self) -> Result<JwkSet> {
        match &self.source {
            KeySource::Static(keys) => Ok(keys.clone()),
            KeySource::Remote { client, cache } => {
                if let Some(cached) = cache.read().await.as_ref() {
                    if cached.fetched_at.elapsed() < self.config.refresh_ttl {
                        return Ok(cached.keys.clone());
                    }
                }

                let keys: JwkSet = client
                    .get(&self.config.jwks_url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| CredentialError::KeySetUnavailable(e.to_string()))?
                    .json()
                    .await
                    .map_err(|e| CredentialError::KeySetUnavailable(e.to_string()))?;

                tracing::debug!(
                    url = %self.config.jwks_url,
                    keys = keys.keys.len(),
                    "Refreshed JWKS cache"
                );

                *cache.write().await = Some(CachedKeys {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(keys)
            }
        }
    }

    /// Verify an identity token and return its claims.
    ///
    /// # Errors
    ///
    /// Fails with the verification taxonomy of [`CredentialError`],
    /// or [`CredentialError::KeySetUnavailable`] when the key set
    /// cannot be fetched within the bound (fail closed).
    pub async fn verify(&self, token: &str) -> Result<IdentityClaims> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| CredentialError::Malformed(e.to_string()))?;
        let keys = self.key_set().await?;
        let jwk = keys
            .find(header.kid.as_deref())
            .ok_or_else(|| CredentialError::KeySetUnavailable("empty key set".to_string()))?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        decode_identity(token, &key, &self.config.issuer)
    }

    /// Verify a token and build the typed capability context from it.
    ///
    /// # Errors
    ///
    /// Same as [`JwksVerifier::verify`].
    pub async fn context(&self, token: &str) -> Result<CapabilityContext> {
        Ok(self.verify(token).await?.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::jwks::build_rsa_jwk;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use rsa::RsaPrivateKey;

    struct TestKeys {
        issuer: IdentityTokens,
        verifier: JwksVerifier,
    }

    fn test_keys() -> TestKeys {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let issuer =
            IdentityTokens::new(IdentityIssuerConfig::new(private_pem)).unwrap();
        let jwk = build_rsa_jwk(&public_pem, "authentication-svc").unwrap();
        let verifier = JwksVerifier::with_static_keys(
            JwksClientConfig::new("http://unused/jwks.json", "authentication-svc"),
            JwkSet { keys: vec![jwk] },
        );
        TestKeys { issuer, verifier }
    }

    #[tokio::test]
    async fn identity_round_trip_builds_capability_context() {
        let keys = test_keys();
        let subject = UserId::new();
        let org = OrgId::new();

        let (token, expires_in) = keys
            .issuer
            .issue(subject, Role::Organiser, vec![org])
            .unwrap();
        assert_eq!(expires_in, 30 * 60);

        let claims = keys.verifier.verify(&token).await.unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.role, Role::Organiser);
        assert_eq!(claims.org_ids, vec![org]);
        assert!(!claims.jti.is_empty());

        let ctx = keys.verifier.context(&token).await.unwrap();
        assert!(ctx.can_manage_org(org));
    }

    #[tokio::test]
    async fn rejects_token_from_a_different_key_pair() {
        let signer = test_keys();
        let other_verifier = test_keys().verifier;

        let (token, _) = signer
            .issuer
            .issue(UserId::new(), Role::Attendee, vec![])
            .unwrap();
        assert!(matches!(
            other_verifier.verify(&token).await,
            Err(CredentialError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let issuer = IdentityTokens::new(
            IdentityIssuerConfig::new(private_pem).with_issuer("rogue-svc"),
        )
        .unwrap();
        let jwk = build_rsa_jwk(&public_pem, "rogue-svc").unwrap();
        let verifier = JwksVerifier::with_static_keys(
            JwksClientConfig::new("http://unused", "authentication-svc"),
            JwkSet { keys: vec![jwk] },
        );

        let (token, _) = issuer.issue(UserId::new(), Role::Service, vec![]).unwrap();
        assert!(matches!(
            verifier.verify(&token).await,
            Err(CredentialError::WrongIssuer)
        ));
    }

    #[tokio::test]
    async fn rejects_expired_identity_token() {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let issuer = IdentityTokens::new(
            IdentityIssuerConfig::new(private_pem).with_expires_minutes(-1),
        )
        .unwrap();
        let jwk = build_rsa_jwk(&public_pem, "authentication-svc").unwrap();
        let verifier = JwksVerifier::with_static_keys(
            JwksClientConfig::new("http://unused", "authentication-svc"),
            JwkSet { keys: vec![jwk] },
        );

        let (token, _) = issuer.issue(UserId::new(), Role::Attendee, vec![]).unwrap();
        assert!(matches!(
            verifier.verify(&token).await,
            Err(CredentialError::Expired)
        ));
    }
}
