/// Task lifecycle operations
///
/// Owns task creation, lookup, listing and the single-step status advance.
/// Transitions come from [`TaskStatus::next`]; persistence of a transition is
/// a compare-and-swap on the previously read status, so two requests
/// advancing the same task concurrently can never both move it past the same
/// level.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskflow_shared::models::task::TaskStatus;
/// use taskflow_shared::services::tasks::{NewTask, TaskService};
/// use taskflow_shared::store::InMemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TaskService::new(Arc::new(InMemoryStore::new()));
///
/// let task = service.create(1, NewTask::named("Write report")).await?;
/// assert_eq!(task.status, TaskStatus::Todo);
///
/// let task = service.advance(task.id).await?;
/// assert_eq!(task.status, TaskStatus::InProgress);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tracing::{debug, info};

use crate::models::task::{CreateTask, Task, TaskStatus};
use crate::models::MAX_TEXT_LEN;
use crate::store::{Store, StoreError};

/// Errors from task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Input failed validation
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No task with this ID
    #[error("task {0} not found")]
    NotFound(i64),

    /// The task is `DONE` and cannot advance
    #[error("task {0} is already done")]
    AlreadyDone(i64),

    /// Another request advanced the task between our read and write
    #[error("task {id} is no longer {expected}")]
    StatusChanged { id: i64, expected: TaskStatus },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TaskError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        TaskError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,

    /// Defaults to `TODO`
    pub status: Option<TaskStatus>,

    /// Defaults to the requester
    pub assigned_to_id: Option<i64>,

    pub project_id: Option<i64>,
}

impl NewTask {
    /// A task with only a name; everything else defaults
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Task lifecycle service
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a task on behalf of `requester_id`
    ///
    /// # Errors
    ///
    /// - `Validation { field: "name" }` when the name is blank or longer than
    ///   [`MAX_TEXT_LEN`] characters
    /// - `Validation { field: "assigned_to_id" }` when the assignee does not exist
    pub async fn create(&self, requester_id: i64, new_task: NewTask) -> Result<Task, TaskError> {
        if new_task.name.trim().is_empty() {
            return Err(TaskError::validation("name", "name is required"));
        }
        if new_task.name.chars().count() > MAX_TEXT_LEN {
            return Err(TaskError::validation(
                "name",
                format!("name must be at most {} characters", MAX_TEXT_LEN),
            ));
        }

        let assigned_to_id = match new_task.assigned_to_id {
            Some(id) if id != requester_id => {
                if self.store.get_user_by_id(id).await?.is_none() {
                    return Err(TaskError::validation(
                        "assigned_to_id",
                        format!("user {} does not exist", id),
                    ));
                }
                id
            }
            _ => requester_id,
        };

        let task = self
            .store
            .create_task(CreateTask {
                name: new_task.name,
                status: new_task.status.unwrap_or_default(),
                assigned_to_id,
                project_id: new_task.project_id,
            })
            .await?;

        info!(task_id = task.id, assigned_to_id, status = %task.status, "Task created");
        Ok(task)
    }

    /// Fetches a task by ID
    pub async fn get(&self, id: i64) -> Result<Task, TaskError> {
        self.store
            .get_task(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Moves a task one step forward and returns it with its new status
    ///
    /// # Errors
    ///
    /// - `NotFound` when the task does not exist
    /// - `AlreadyDone` when the task is `DONE`; nothing is written
    /// - `StatusChanged` when a concurrent advance won the race for this step
    pub async fn advance(&self, id: i64) -> Result<Task, TaskError> {
        let current = self.get(id).await?;
        let next = current.status.next().ok_or(TaskError::AlreadyDone(id))?;

        if let Some(task) = self
            .store
            .update_task_status(id, current.status, next)
            .await?
        {
            info!(task_id = id, from = %current.status, to = %next, "Task advanced");
            return Ok(task);
        }

        debug!(task_id = id, expected = %current.status, "Lost status race");
        match self.store.get_task(id).await? {
            None => Err(TaskError::NotFound(id)),
            Some(task) if task.status.is_terminal() => Err(TaskError::AlreadyDone(id)),
            Some(_) => Err(TaskError::StatusChanged {
                id,
                expected: current.status,
            }),
        }
    }

    /// Lists tasks assigned to a user, oldest first
    ///
    /// An empty list is a normal outcome.
    pub async fn list_assigned_to(&self, user_id: i64) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list_tasks_assigned_to_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::store::InMemoryStore;

    async fn setup() -> (TaskService, Arc<InMemoryStore>, i64) {
        let store = Arc::new(InMemoryStore::new());
        let user = store
            .create_user(CreateUser {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: "j@d.com".to_string(),
                password_hash: "$argon2id$hash".to_string(),
            })
            .await
            .unwrap();
        (TaskService::new(store.clone()), store, user.id)
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (service, _, user_id) = setup().await;

        let task = service.create(user_id, NewTask::named("Write report")).await.unwrap();

        assert!(task.id > 0);
        assert_eq!(task.name, "Write report");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.assigned_to_id, user_id);
        assert_eq!(task.project_id, None);
    }

    #[tokio::test]
    async fn test_create_with_explicit_fields() {
        let (service, store, user_id) = setup().await;
        let other = store
            .create_user(CreateUser {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@d.com".to_string(),
                password_hash: "$argon2id$hash".to_string(),
            })
            .await
            .unwrap();

        let task = service
            .create(
                user_id,
                NewTask {
                    name: "Review".to_string(),
                    status: Some(TaskStatus::InTesting),
                    assigned_to_id: Some(other.id),
                    project_id: Some(3),
                },
            )
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::InTesting);
        assert_eq!(task.assigned_to_id, other.id);
        assert_eq!(task.project_id, Some(3));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (service, _, user_id) = setup().await;

        for name in ["", "   "] {
            let err = service.create(user_id, NewTask::named(name)).await.unwrap_err();
            assert!(matches!(err, TaskError::Validation { field: "name", .. }));
        }
    }

    #[tokio::test]
    async fn test_create_name_length_limit() {
        let (service, _, user_id) = setup().await;

        let at_limit = "a".repeat(MAX_TEXT_LEN);
        let task = service.create(user_id, NewTask::named(at_limit.clone())).await.unwrap();
        assert_eq!(task.name, at_limit);

        let err = service
            .create(user_id, NewTask::named("a".repeat(MAX_TEXT_LEN + 1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Validation { field: "name", message } if message == "name must be at most 255 characters"
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_assignee() {
        let (service, _, user_id) = setup().await;

        let new_task = NewTask {
            assigned_to_id: Some(404),
            ..NewTask::named("Orphan")
        };
        let err = service.create(user_id, new_task).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "assigned_to_id", .. }));
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let (service, _, _) = setup().await;

        assert!(matches!(service.get(42).await, Err(TaskError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_advance_walks_the_lifecycle() {
        let (service, _, user_id) = setup().await;
        let task = service.create(user_id, NewTask::named("Ship")).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let advanced = service.advance(task.id).await.unwrap();
            // The stored status matches what was returned
            assert_eq!(service.get(task.id).await.unwrap().status, advanced.status);
            seen.push(advanced.status);
        }
        assert_eq!(
            seen,
            [TaskStatus::InProgress, TaskStatus::InTesting, TaskStatus::Done]
        );

        let err = service.advance(task.id).await.unwrap_err();
        assert!(matches!(err, TaskError::AlreadyDone(id) if id == task.id));
        assert_eq!(service.get(task.id).await.unwrap().status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_advance_missing_task() {
        let (service, _, _) = setup().await;

        assert!(matches!(service.advance(7).await, Err(TaskError::NotFound(7))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_advances_never_skip() {
        let (service, _, user_id) = setup().await;
        let id = service.create(user_id, NewTask::named("Race")).await.unwrap().id;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.advance(id).await })
            })
            .collect();

        let mut successes = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(task) => successes.push(task.status),
                Err(TaskError::AlreadyDone(_)) | Err(TaskError::StatusChanged { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        // Each level is reached by exactly one request and none is skipped
        successes.sort();
        assert!(!successes.is_empty() && successes.len() <= 3, "{successes:?}");
        let levels = [TaskStatus::InProgress, TaskStatus::InTesting, TaskStatus::Done];
        assert_eq!(successes, levels[..successes.len()]);

        let stored = service.get(id).await.unwrap().status;
        assert_eq!(Some(&stored), successes.last());
    }

    #[tokio::test]
    async fn test_list_assigned_to() {
        let (service, _, user_id) = setup().await;

        assert!(service.list_assigned_to(user_id).await.unwrap().is_empty());

        service.create(user_id, NewTask::named("Task 1")).await.unwrap();
        service.create(user_id, NewTask::named("Task 2")).await.unwrap();

        let names: Vec<_> = service
            .list_assigned_to(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["Task 1", "Task 2"]);
    }
}
