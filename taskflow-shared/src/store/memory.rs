//! In-memory store for tests and database-less local runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Store, StoreError, StoreResult};
use crate::models::{
    task::{CreateTask, Task, TaskStatus},
    user::{CreateUser, User},
};

/// Thread-safe in-memory store
///
/// IDs start at 1 and increase monotonically. `BTreeMap` keeps tasks in
/// insertion order for listing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_task_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.write()?;

        if state.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::DuplicateEmail(data.email));
        }

        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut state = self.write()?;

        state.last_task_id += 1;
        let task = Task {
            id: state.last_task_id,
            name: data.name,
            status: data.status,
            assigned_to_id: data.assigned_to_id,
            project_id: data.project_id,
            created_at: Utc::now(),
        };
        state.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn get_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn update_task_status(
        &self,
        id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;

        match state.tasks.get_mut(&id) {
            Some(task) if task.status == from => {
                task.status = to;
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_tasks_assigned_to_user(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        Ok(self
            .read()?
            .tasks
            .values()
            .filter(|t| t.assigned_to_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$hash".to_string(),
        }
    }

    fn new_task(name: &str, assigned_to_id: i64) -> CreateTask {
        CreateTask {
            name: name.to_string(),
            status: TaskStatus::Todo,
            assigned_to_id,
            project_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let store = InMemoryStore::new();

        let user = store.create_user(new_user("john.doe@example.com")).await.unwrap();
        assert_eq!(user.id, 1);

        let found = store.get_user_by_id(1).await.unwrap().unwrap();
        assert_eq!(found, user);
        assert!(store.get_user_by_id(2).await.unwrap().is_none());

        let by_email = store.get_user_by_email("john.doe@example.com").await.unwrap();
        assert_eq!(by_email, Some(user));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = InMemoryStore::new();
        store.create_user(new_user("j@d.com")).await.unwrap();

        let err = store.create_user(new_user("j@d.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(email) if email == "j@d.com"));
    }

    #[tokio::test]
    async fn test_task_ids_increase() {
        let store = InMemoryStore::new();

        let first = store.create_task(new_task("Task 1", 1)).await.unwrap();
        let second = store.create_task(new_task("Task 2", 1)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.get_task(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_update_status_is_conditional() {
        let store = InMemoryStore::new();
        let task = store.create_task(new_task("Task", 1)).await.unwrap();

        let updated = store
            .update_task_status(task.id, TaskStatus::Todo, TaskStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);

        // Stale expected status: no write
        let stale = store
            .update_task_status(task.id, TaskStatus::Todo, TaskStatus::InProgress)
            .await
            .unwrap();
        assert!(stale.is_none());

        let missing = store
            .update_task_status(99, TaskStatus::Todo, TaskStatus::InProgress)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_assigned_in_insertion_order() {
        let store = InMemoryStore::new();
        store.create_task(new_task("Task 1", 1)).await.unwrap();
        store.create_task(new_task("Other", 2)).await.unwrap();
        store.create_task(new_task("Task 2", 1)).await.unwrap();

        let tasks = store.list_tasks_assigned_to_user(1).await.unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Task 1", "Task 2"]);

        assert!(store.list_tasks_assigned_to_user(3).await.unwrap().is_empty());
    }
}
