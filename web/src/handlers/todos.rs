//! Todo API endpoints.
//!
//! - GET /api/todos - The caller's todos with dashboard stats
//! - POST /api/todos - Create a todo
//! - POST /api/todos/:id/toggle - Flip completion
//! - PATCH /api/todos/:id - Update text, priority or due date
//! - DELETE /api/todos/:id - Delete a todo

use crate::WebResult;
use crate::extractors::CurrentCaller;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use todoflow_core::{
    NewTodo, Priority, PriorityFilter, StatusFilter, Todo, TodoError, TodoFilter, TodoId,
    TodoPatch, TodoStats, TodoStore,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing todos.
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    /// `all`, `active` or `completed`
    pub status: Option<String>,
    /// `all`, `high`, `medium` or `low`
    pub priority: Option<String>,
}

impl ListTodosQuery {
    fn filter(&self) -> Result<TodoFilter, TodoError> {
        Ok(TodoFilter {
            status: self
                .status
                .as_deref()
                .map(str::parse::<StatusFilter>)
                .transpose()?
                .unwrap_or_default(),
            priority: self
                .priority
                .as_deref()
                .map(str::parse::<PriorityFilter>)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

/// Response for listing todos.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosResponse {
    /// Todos passing the filter, newest first
    pub todos: Vec<Todo>,
    /// Counters over all of the caller's todos
    pub stats: TodoStats,
    /// Message to show when `todos` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

/// Request to create a todo.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// Description
    pub text: String,
    /// `low`, `medium` or `high` (required)
    #[serde(default)]
    pub priority: Option<String>,
    /// Due date in milliseconds since the Unix epoch
    #[serde(default)]
    pub due_date: Option<i64>,
}

impl CreateTodoRequest {
    fn into_draft(self) -> Result<NewTodo, TodoError> {
        let priority = self
            .priority
            .as_deref()
            .map(Priority::parse)
            .transpose()?
            .ok_or_else(|| TodoError::validation("priority", "is required"))?;

        Ok(NewTodo {
            text: self.text,
            priority,
            due_date: self.due_date,
        })
    }
}

/// Response after creating a todo.
#[derive(Debug, Serialize)]
pub struct CreateTodoResponse {
    /// Created todo ID
    pub id: TodoId,
}

/// Request to update a todo. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    /// Replacement text (trimmed, must not be empty)
    #[serde(default)]
    pub text: Option<String>,
    /// Replacement priority
    #[serde(default)]
    pub priority: Option<String>,
    /// Replacement due date
    #[serde(default)]
    pub due_date: Option<i64>,
}

impl UpdateTodoRequest {
    fn into_patch(self) -> Result<TodoPatch, TodoError> {
        let text = self
            .text
            .map(|text| {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(TodoError::validation("text", "must not be empty"))
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .transpose()?;
        let priority = self.priority.as_deref().map(Priority::parse).transpose()?;

        Ok(TodoPatch {
            text,
            priority,
            due_date: self.due_date,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List the caller's todos.
///
/// Anonymous callers get an empty list.
///
/// # Errors
///
/// - 422 for an unknown `status` or `priority` filter
/// - 500 if the store fails
pub async fn list_todos<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    CurrentCaller(caller): CurrentCaller,
    Query(query): Query<ListTodosQuery>,
) -> WebResult<Json<ListTodosResponse>> {
    let filter = query.filter()?;
    let all = state.todos.list(&caller).await?;

    let stats = TodoStats::from_todos(&all);
    let todos = filter.apply(all);
    let empty_message = todos.is_empty().then(|| filter.empty_message());

    Ok(Json(ListTodosResponse {
        todos,
        stats,
        empty_message,
    }))
}

/// Create a todo owned by the caller.
///
/// # Errors
///
/// - 401 for anonymous callers
/// - 422 for a missing or unknown priority
/// - 500 if the store fails
pub async fn create_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    CurrentCaller(caller): CurrentCaller,
    Json(request): Json<CreateTodoRequest>,
) -> WebResult<(StatusCode, Json<CreateTodoResponse>)> {
    let draft = request.into_draft()?;
    let id = state.todos.create(&caller, draft).await?;

    Ok((StatusCode::CREATED, Json(CreateTodoResponse { id })))
}

/// Flip the completion flag of one of the caller's todos.
///
/// # Errors
///
/// - 401 for anonymous callers
/// - 404 if the todo is missing or belongs to someone else
/// - 422 for a malformed id
pub async fn toggle_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
) -> WebResult<Json<Todo>> {
    let id: TodoId = id.parse()?;
    Ok(Json(state.todos.toggle(&caller, id).await?))
}

/// Update one of the caller's todos.
///
/// # Errors
///
/// - 401 for anonymous callers
/// - 404 if the todo is missing or belongs to someone else
/// - 422 for a malformed id, empty text or unknown priority
pub async fn update_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
    Json(request): Json<UpdateTodoRequest>,
) -> WebResult<Json<Todo>> {
    let id: TodoId = id.parse()?;
    let patch = request.into_patch()?;
    Ok(Json(state.todos.update(&caller, id, patch).await?))
}

/// Delete one of the caller's todos.
///
/// # Errors
///
/// - 401 for anonymous callers
/// - 404 if the todo is missing, foreign or already deleted
/// - 422 for a malformed id
pub async fn remove_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
) -> WebResult<StatusCode> {
    let id: TodoId = id.parse()?;
    state.todos.remove(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
