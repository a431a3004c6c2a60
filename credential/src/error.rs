//! Error types for credential operations.

use thiserror::Error;

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Why a token failed to issue or verify.
///
/// Verification errors are definitive rejections; none of them are
/// retryable. [`CredentialError::KeySetUnavailable`] is the one
/// transient case — the caller fails closed and may retry later.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The signature does not match the signing key.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token's expiry has passed.
    #[error("Token has expired")]
    Expired,

    /// The token's audience does not match the expected audience.
    #[error("Wrong token audience")]
    WrongAudience,

    /// The token's issuer does not match the expected issuer.
    #[error("Wrong token issuer")]
    WrongIssuer,

    /// The token's scope does not match the expected scope.
    #[error("Wrong token scope")]
    WrongScope,

    /// A required claim is absent.
    #[error("Missing claim: {0}")]
    MissingClaim(&'static str),

    /// The token is not decodable at all.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// A signing or decoding key could not be constructed.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// The remote key set could not be fetched within the bound.
    #[error("Key set unavailable: {0}")]
    KeySetUnavailable(String),
}

impl CredentialError {
    /// Map a `jsonwebtoken` failure onto the verification taxonomy.
    pub(crate) fn from_jwt(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidAudience => Self::WrongAudience,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            ErrorKind::MissingRequiredClaim(name) => match name.as_str() {
                "exp" => Self::MissingClaim("exp"),
                "aud" => Self::MissingClaim("aud"),
                "iss" => Self::MissingClaim("iss"),
                _ => Self::Malformed(format!("missing claim {name}")),
            },
            _ => Self::Malformed(err.to_string()),
        }
    }

    /// Whether the failure is transient (worth a later retry).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::KeySetUnavailable(_))
    }
}
