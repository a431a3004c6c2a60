//! JWKS document construction and parsing.
//!
//! The identity issuer publishes its RSA public key as a small JSON
//! key-set document; verifiers fetch it and rebuild the decoding key
//! from the `n`/`e` components (URL-safe unpadded base64 big-endian
//! integers).

use crate::error::{CredentialError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

/// A single public-key record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (`RSA`).
    pub kty: String,
    /// Signing algorithm (`RS256`).
    pub alg: String,
    /// Key usage (`sig`).
    #[serde(rename = "use")]
    pub usage: String,
    /// Stable key identifier.
    pub kid: String,
    /// Modulus, URL-safe unpadded base64, big-endian.
    pub n: String,
    /// Public exponent, URL-safe unpadded base64, big-endian.
    pub e: String,
}

/// The published key set: `{"keys": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Public-key records, newest first.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// The record matching `kid`, or the first key when no kid is
    /// given or nothing matches.
    #[must_use]
    pub fn find(&self, kid: Option<&str>) -> Option<&Jwk> {
        kid.and_then(|k| self.keys.iter().find(|jwk| jwk.kid == k))
            .or_else(|| self.keys.first())
    }
}

/// Build the JWK record for an RSA public key in PEM form.
///
/// # Errors
///
/// Returns [`CredentialError::InvalidKey`] if the PEM is not a valid
/// RSA public key.
pub fn build_rsa_jwk(public_key_pem: &str, kid: &str) -> Result<Jwk> {
    let key = RsaPublicKey::from_public_key_pem(public_key_pem)
        .map_err(|e| CredentialError::InvalidKey(format!("not an RSA public key: {e}")))?;
    Ok(Jwk {
        kty: "RSA".to_string(),
        alg: "RS256".to_string(),
        usage: "sig".to_string(),
        kid: kid.to_string(),
        n: URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::RsaPrivateKey;

    #[test]
    fn jwk_encodes_components_url_safe_unpadded() {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let jwk = build_rsa_jwk(&public_pem, "authentication-svc").unwrap();
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg, "RS256");
        assert_eq!(jwk.usage, "sig");
        assert!(!jwk.n.contains('='));
        assert!(!jwk.n.contains('+'));
        assert!(!jwk.n.contains('/'));
        // 65537
        assert_eq!(jwk.e, "AQAB");

        // The document round-trips and `use` keeps its wire name.
        let doc = serde_json::to_value(JwkSet { keys: vec![jwk.clone()] }).unwrap();
        assert_eq!(doc["keys"][0]["use"], "sig");
        let back: JwkSet = serde_json::from_value(doc).unwrap();
        assert_eq!(back.keys[0], jwk);
    }

    #[test]
    fn find_prefers_matching_kid_then_first() {
        let a = Jwk {
            kty: "RSA".into(),
            alg: "RS256".into(),
            usage: "sig".into(),
            kid: "a".into(),
            n: "n1".into(),
            e: "AQAB".into(),
        };
        let b = Jwk { kid: "b".into(), ..a.clone() };
        let set = JwkSet { keys: vec![a.clone(), b.clone()] };

        assert_eq!(set.find(Some("b")).unwrap().kid, "b");
        assert_eq!(set.find(Some("missing")).unwrap().kid, "a");
        assert_eq!(set.find(None).unwrap().kid, "a");
    }

    #[test]
    fn rejects_garbage_pem() {
        assert!(matches!(
            build_rsa_jwk("not a pem", "kid"),
            Err(CredentialError::InvalidKey(_))
        ));
    }
}
