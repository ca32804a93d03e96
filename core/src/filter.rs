//! Dashboard view filters and statistics.
//!
//! Filtering happens over a list already scoped to one owner. Statistics are
//! always computed over the unfiltered list.

use crate::error::{Result, TodoError};
use crate::types::{Priority, Todo};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Completion filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every todo
    #[default]
    All,
    /// Open todos only
    Active,
    /// Completed todos only
    Completed,
}

impl StatusFilter {
    /// Returns `true` if `todo` passes this filter.
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(TodoError::validation(
                "status",
                format!("'{s}' is not one of all, active, completed"),
            )),
        }
    }
}

/// Priority filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    /// Any priority
    #[default]
    All,
    /// `high` only
    High,
    /// `medium` only
    Medium,
    /// `low` only
    Low,
}

impl PriorityFilter {
    /// Returns `true` if `todo` passes this filter.
    #[must_use]
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::High => todo.priority == Priority::High,
            Self::Medium => todo.priority == Priority::Medium,
            Self::Low => todo.priority == Priority::Low,
        }
    }
}

impl From<Priority> for PriorityFilter {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => Self::Low,
            Priority::Medium => Self::Medium,
            Priority::High => Self::High,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "all" {
            return Ok(Self::All);
        }
        Priority::parse(s).map(Self::from)
    }
}

/// Combined status and priority filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoFilter {
    /// Completion filter
    pub status: StatusFilter,
    /// Priority filter
    pub priority: PriorityFilter,
}

impl TodoFilter {
    /// Returns `true` if `todo` passes both filters.
    #[must_use]
    pub fn matches(&self, todo: &Todo) -> bool {
        self.status.matches(todo) && self.priority.matches(todo)
    }

    /// Keep the todos passing the filter, preserving order.
    #[must_use]
    pub fn apply(&self, todos: Vec<Todo>) -> Vec<Todo> {
        todos.into_iter().filter(|todo| self.matches(todo)).collect()
    }

    /// Message shown when the filtered list is empty.
    ///
    /// Depends on the status filter only.
    #[must_use]
    pub const fn empty_message(&self) -> &'static str {
        match self.status {
            StatusFilter::All => "No todos yet",
            StatusFilter::Active => "No active tasks",
            StatusFilter::Completed => "No completed tasks yet",
        }
    }
}

/// Dashboard counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    /// Number of todos
    pub total: usize,
    /// Number of completed todos
    pub completed: usize,
    /// Number of open todos
    pub remaining: usize,
}

impl TodoStats {
    /// Count the given todos.
    #[must_use]
    pub fn from_todos(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|todo| todo.completed).count();
        Self {
            total: todos.len(),
            completed,
            remaining: todos.len() - completed,
        }
    }
}
