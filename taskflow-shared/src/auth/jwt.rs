/// Session token issuance and validation
///
/// Session tokens are JWTs signed with HS256 (HMAC-SHA256) over a shared
/// secret. They bind a user ID to an expiration instant and are never
/// persisted: every protected request re-validates the token it carries.
///
/// # Claims
///
/// - `sub`: user ID
/// - `iss`: always `"taskflow"`
/// - `iat`: issued at (Unix timestamp)
/// - `exp`: expiration (Unix timestamp, 72 hours after issuance)
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::jwt::{issue_token, validate_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let token = issue_token(42, "local-dev-secret")?;
/// assert_eq!(validate_token(&token, "local-dev-secret")?, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Issuer stamped into and required on every token
pub const ISSUER: &str = "taskflow";

/// Session lifetime
pub const TOKEN_TTL_HOURS: i64 = 72;

/// Error type for token operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signing failed while issuing a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, algorithm or issuer did not match
    #[error("Invalid token signature")]
    InvalidSignature,

    /// `exp` is in the past
    #[error("Token has expired")]
    Expired,

    /// Token could not be decoded
    #[error("Malformed token: {0}")]
    Malformed(String),
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID, as a decimal string
    pub sub: String,

    /// Issuer - always "taskflow"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring [`TOKEN_TTL_HOURS`] from now
    pub fn new(user_id: i64) -> Self {
        Self::with_expiration(user_id, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration yields claims that are already expired.
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Parses the subject back into a user ID
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::Malformed(format!("Subject is not a user ID: {}", self.sub)))
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues a session token for a user
///
/// # Errors
///
/// Returns `TokenError::CreateError` if signing fails.
pub fn issue_token(user_id: i64, secret: &str) -> Result<String, TokenError> {
    create_token(&Claims::new(user_id), secret)
}

/// Validates a token and returns its decoded claims
///
/// # Errors
///
/// - `TokenError::InvalidSignature` for a bad signature, a non-HS256 algorithm
///   or a foreign issuer
/// - `TokenError::Expired` once `exp` has passed
/// - `TokenError::Malformed` for anything that does not decode
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    validation.leeway = 0;
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidIssuer => TokenError::InvalidSignature,
        _ => TokenError::Malformed(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and returns the user ID it was issued for
///
/// # Errors
///
/// See [`decode_claims`].
pub fn validate_token(token: &str, secret: &str) -> Result<i64, TokenError> {
    decode_claims(token, secret)?.user_id()
}
