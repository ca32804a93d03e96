//! Domain types for TodoFlow.
//!
//! A todo belongs to exactly one user. The owner is recorded at creation and
//! never reassigned; every other field except the id and creation time can
//! change through `toggle` or `update`.

use crate::error::{Result, TodoError};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a new random `TodoId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TodoError::validation("id", format!("'{s}' is not a valid todo id")))
    }
}

/// Opaque identifier of an authenticated user, as issued by the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Creates a `UserId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| TodoError::validation("user_id", format!("'{s}' is not a valid user id")))
    }
}

/// Who is calling a data-access operation.
///
/// Resolved by the identity boundary and passed explicitly to every
/// operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Caller {
    /// No identity could be resolved for the request
    Anonymous,
    /// An authenticated user
    User(UserId),
}

impl Caller {
    /// Returns the caller's user id, if authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    /// Returns `true` if the caller is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl From<Option<UserId>> for Caller {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Self::Anonymous, Self::User)
    }
}

/// Todo priority. No other value is ever persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority
    Low,
    /// Medium priority (the default offered by the add form)
    #[default]
    Medium,
    /// High priority
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a priority from its wire/database representation.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] if the string is not `low`, `medium` or `high`.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TodoError::validation(
                "priority",
                format!("'{s}' is not one of low, medium, high"),
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A single todo record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Human-readable description
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
    /// The user who created the todo
    pub owner_id: UserId,
    /// Priority
    pub priority: Priority,
    /// Due date in milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Builds a fresh, not yet completed record owned by `owner`.
    ///
    /// `created_at` is truncated to microseconds, the finest precision any
    /// store keeps.
    #[must_use]
    pub fn new(id: TodoId, owner_id: UserId, draft: NewTodo, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: draft.text,
            completed: false,
            owner_id,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: created_at.trunc_subsecs(6),
        }
    }

    /// Returns `true` if `user` owns this todo.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Flips the completion flag.
    pub const fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// A todo is overdue when it has a due date strictly before `now` and is
    /// still open.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed
            && self
                .due_date
                .is_some_and(|due| due < now.timestamp_millis())
    }
}

/// Input for `create`.
///
/// Text is taken as-is; trimming and non-empty checks belong to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    /// Description
    pub text: String,
    /// Priority
    pub priority: Priority,
    /// Optional due date in milliseconds since the Unix epoch
    #[serde(default)]
    pub due_date: Option<i64>,
}

impl NewTodo {
    /// Creates a draft with no due date.
    #[must_use]
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
            due_date: None,
        }
    }

    /// Sets the due date (milliseconds since the Unix epoch).
    #[must_use]
    pub fn due(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update for `update`.
///
/// `None` means "leave unchanged". There is no way to clear `due_date`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    /// Replacement text
    #[serde(default)]
    pub text: Option<String>,
    /// Replacement priority
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Replacement due date
    #[serde(default)]
    pub due_date: Option<i64>,
}

impl TodoPatch {
    /// Returns `true` if the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.priority.is_none() && self.due_date.is_none()
    }

    /// Merges the provided fields into `todo`.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(text) = &self.text {
            todo.text.clone_from(text);
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = Some(due_date);
        }
    }
}
