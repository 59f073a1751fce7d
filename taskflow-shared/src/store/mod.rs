/// Persistence contract for users and tasks
///
/// Services and the authorization layer only ever talk to `dyn Store`, so the
/// PostgreSQL implementation can be swapped for the in-memory one in tests or
/// local runs.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx over a `PgPool`
/// - [`memory::InMemoryStore`]: maps behind an `RwLock`
///
/// # Concurrency
///
/// [`Store::update_task_status`] is a compare-and-swap: it only writes when the
/// task still holds the expected status. That is the sole concurrency control
/// for status changes; callers hold no locks of their own.

use crate::models::{
    task::{CreateTask, Task, TaskStatus},
    user::{CreateUser, User},
};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email already exists
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store cannot serve requests (e.g. a poisoned lock)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// User and task persistence
#[async_trait]
pub trait Store: Send + Sync {
    /// Persists a new user and returns it with its assigned ID
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds a user by ID
    async fn get_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Finds a user by email
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Persists a new task and returns it with its assigned ID and timestamp
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Finds a task by ID
    async fn get_task(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Moves a task from `from` to `to`
    ///
    /// Returns the updated task, or `None` when no task with `id` currently
    /// holds status `from` (absent, or moved on by someone else).
    async fn update_task_status(
        &self,
        id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> StoreResult<Option<Task>>;

    /// Lists tasks assigned to a user in insertion order
    ///
    /// Returns an empty vector when nothing is assigned.
    async fn list_tasks_assigned_to_user(&self, user_id: i64) -> StoreResult<Vec<Task>>;

    /// Checks that the store is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
