/// Business operations on top of [`crate::store::Store`]
///
/// - `tasks`: task creation, lookup, listing and status advance
/// - `users`: registration, lookup and credential checks

pub mod tasks;
pub mod users;
