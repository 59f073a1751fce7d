/// Request authentication core
///
/// Framework-independent pieces of the authorization layer: pulling a token
/// out of a request, validating it and resolving the subject user. The axum
/// layer in `taskflow-api` calls [`extract_token`] and [`authenticate`] and
/// inserts the resulting [`AuthContext`] into request extensions.
///
/// # Token lookup order
///
/// 1. `Authorization` header (raw token; a `Bearer ` prefix is tolerated)
/// 2. `token` query parameter
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskflow_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap, Uri};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::jwt::{validate_token, TokenError};
use crate::store::{Store, StoreError};

/// Name of the query parameter carrying a token
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Authenticated requester, added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// ID of an existing user
    pub user_id: i64,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token in header or query
    #[error("missing credentials")]
    MissingCredentials,

    /// Token failed validation
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    /// Token is valid but its user no longer exists
    #[error("unknown user {0}")]
    UnknownUser(i64),

    /// User lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Whether the failure is the requester's fault (401) rather than ours
    pub fn is_credential_failure(&self) -> bool {
        !matches!(self, AuthError::Store(_))
    }
}

#[derive(Deserialize)]
struct TokenParams {
    token: Option<String>,
}

/// Extracts a token from the `Authorization` header, falling back to the
/// `token` query parameter
///
/// Empty values are treated as absent.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
        .filter(|v| !v.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    axum::extract::Query::<TokenParams>::try_from_uri(uri)
        .ok()
        .and_then(|q| q.0.token)
        .filter(|t| !t.is_empty())
}

/// Validates a token and resolves its user against the store
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] when `token` is `None`
/// - [`AuthError::InvalidToken`] for any signature, expiry or decoding failure
/// - [`AuthError::UnknownUser`] when the user in the token does not exist
/// - [`AuthError::Store`] when the lookup itself fails
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    token: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let token = token.ok_or(AuthError::MissingCredentials)?;

    let user_id = validate_token(token, secret)?;

    match store.get_user_by_id(user_id).await? {
        Some(user) => Ok(AuthContext { user_id: user.id }),
        None => {
            debug!(user_id, "Token refers to a user that does not exist");
            Err(AuthError::UnknownUser(user_id))
        }
    }
}
