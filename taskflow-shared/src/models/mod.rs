/// Domain models
///
/// - `user`: registered users
/// - `task`: tasks and the status state machine

pub mod task;
pub mod user;

/// Width of the `VARCHAR` text columns in the schema, in characters
pub const MAX_TEXT_LEN: usize = 255;
