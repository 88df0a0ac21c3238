//! Task domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_SORT_ORDER;
use crate::{Error, Result};

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::invalid_input(format!("Unknown priority '{}'", other))),
        }
    }
}

/// Domain model representing a task on a personal list or a shared board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Creator of the task. Owner of the task when it is not on a board.
    pub user_id: String,
    pub shared_board_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Task {
    /// Tasks without a board belong to their owner's personal list.
    pub fn is_personal(&self) -> bool {
        self.shared_board_id.is_none()
    }

    pub fn list(&self) -> TaskList {
        match &self.shared_board_id {
            Some(board_id) => TaskList::Board(board_id.clone()),
            None => TaskList::Personal(self.user_id.clone()),
        }
    }
}

/// The list a task renders in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskList {
    /// Personal list of the given user
    Personal(String),
    /// Shared board with the given id
    Board(String),
}

/// Input model for creating a new task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub shared_board_id: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl NewTask {
    /// Trims text fields and fills defaults. Fails when the title is blank.
    pub fn normalize(self) -> Result<NewTask> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::missing_field("title"));
        }
        let shared_board_id = self
            .shared_board_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Ok(NewTask {
            title,
            description: normalize_description(self.description),
            priority: Some(self.priority.unwrap_or_default()),
            shared_board_id,
            sort_order: Some(self.sort_order.unwrap_or(DEFAULT_SORT_ORDER)),
        })
    }
}

/// Partial update of a task. Absent fields are left untouched.
///
/// `description` distinguishes "absent" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl TaskUpdate {
    pub fn normalize(self) -> Result<TaskUpdate> {
        let title = match self.title {
            Some(title) => {
                let trimmed = title.trim().to_string();
                if trimmed.is_empty() {
                    return Err(Error::missing_field("title"));
                }
                Some(trimmed)
            }
            None => None,
        };
        Ok(TaskUpdate {
            title,
            description: self.description.map(normalize_description),
            ..self
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.sort_order.is_none()
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Maps a present JSON value (including `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Dashboard filter applied to a list before rendering and moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    High,
    Medium,
    Low,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.completed,
            TaskFilter::Completed => task.completed,
            TaskFilter::High => task.priority == Priority::High,
            TaskFilter::Medium => task.priority == Priority::Medium,
            TaskFilter::Low => task.priority == Priority::Low,
        }
    }

    /// Keeps only the tasks matching the filter, preserving order.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}
