/// Task model and status state machine
///
/// # State Machine
///
/// ```text
/// TODO → IN_PROGRESS → IN_TESTING → DONE
/// ```
///
/// Each advance moves exactly one step forward. `DONE` is terminal. This
/// table (`TaskStatus::next`) is the only place transitions are defined; the
/// store merely swaps one explicit status for another.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'IN_TESTING', 'DONE');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     status task_status NOT NULL DEFAULT 'TODO',
///     assigned_to_id BIGINT NOT NULL REFERENCES users(id),
///     project_id BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Task lifecycle status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started (initial status)
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Work finished, under test
    InTesting,

    /// Terminal
    Done,
}

impl TaskStatus {
    /// All statuses in lifecycle order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::InTesting,
        TaskStatus::Done,
    ];

    /// Wire and database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::InTesting => "IN_TESTING",
            TaskStatus::Done => "DONE",
        }
    }

    /// The status one step forward, or `None` from `DONE`
    pub fn next(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Todo => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::InTesting),
            TaskStatus::InTesting => Some(TaskStatus::Done),
            TaskStatus::Done => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A unit of work assigned to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-assigned task ID
    pub id: i64,

    pub name: String,

    pub status: TaskStatus,

    /// User the task is assigned to
    pub assigned_to_id: i64,

    /// Optional project association
    pub project_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// Validated input for persisting a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub status: TaskStatus,
    pub assigned_to_id: i64,
    pub project_id: Option<i64>,
}
