/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: session token issuance and validation (HS256, 72 h lifetime)
/// - [`middleware`]: token extraction and subject resolution for protected routes
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::{jwt, password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = password::hash_password("user_password")?;
/// assert!(password::verify_password("user_password", &hash)?);
///
/// let token = jwt::issue_token(1, "secret-key")?;
/// assert_eq!(jwt::validate_token(&token, "secret-key")?, 1);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
