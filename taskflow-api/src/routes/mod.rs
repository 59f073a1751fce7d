/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Registration and login
/// - `tasks`: Task creation, lookup, listing and status advance

pub mod health;
pub mod tasks;
pub mod users;

use validator::ValidationError;

/// Fails on an empty string
///
/// Used as `custom(function = "super::required", message = ...)` next to a
/// `length(max = ...)` rule so each limit reports its own message.
pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}
