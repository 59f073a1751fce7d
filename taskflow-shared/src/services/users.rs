/// User registration, lookup and credential checks

use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::password::{self, PasswordError};
use crate::models::user::{CreateUser, User};
use crate::models::MAX_TEXT_LEN;
use crate::store::{Store, StoreError};

/// Errors from user operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// A required field is missing
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Registration with an email that is already in use
    #[error("email {0} is already registered")]
    EmailTaken(String),

    /// Unknown email or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => UserError::EmailTaken(email),
            other => UserError::Store(other),
        }
    }
}

/// Registration input with the plaintext password
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Returns the first invalid field and why, checked as email, password,
    /// first name, last name
    ///
    /// Every field is required; all but the password are stored in
    /// [`MAX_TEXT_LEN`]-character columns.
    fn invalid_field(&self) -> Option<(&'static str, String)> {
        [
            ("email", &self.email, true),
            ("password", &self.password, false),
            ("first_name", &self.first_name, true),
            ("last_name", &self.last_name, true),
        ]
        .into_iter()
        .find_map(|(field, value, bounded)| {
            if value.trim().is_empty() {
                Some((field, format!("{} is required", field)))
            } else if bounded && value.chars().count() > MAX_TEXT_LEN {
                Some((field, format!("{} must be at most {} characters", field, MAX_TEXT_LEN)))
            } else {
                None
            }
        })
    }
}

/// User service
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validates, hashes the password and persists a new user
    ///
    /// # Errors
    ///
    /// - `Validation` naming the first empty or overlong field
    /// - `EmailTaken` when the email is already registered
    /// - `Password` if hashing fails
    pub async fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        if let Some((field, message)) = new_user.invalid_field() {
            return Err(UserError::Validation { field, message });
        }

        let password_hash = password::hash_password(&new_user.password)?;

        let user = self
            .store
            .create_user(CreateUser {
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                email: new_user.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Fetches a user by ID
    pub async fn get(&self, id: i64) -> Result<User, UserError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Checks an email/password pair
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, UserError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash)? {
            debug!(user_id = user.id, "Login attempt with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}
