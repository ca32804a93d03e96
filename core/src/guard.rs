//! Ownership guard.
//!
//! Every operation that addresses an existing record goes through
//! [`authorize`], so a missing record and a foreign record always fail the
//! same way.

use crate::error::{Result, TodoError};
use crate::store::TodoStore;
use crate::types::{Caller, Todo, TodoId, UserId};

/// Resolve the caller to a user id or fail with `Unauthenticated`.
///
/// # Errors
///
/// Returns [`TodoError::Unauthenticated`] for anonymous callers.
pub fn require_user(caller: &Caller) -> Result<UserId> {
    caller.user_id().ok_or_else(|| {
        metrics::counter!("todos.auth_failures", "reason" => "unauthenticated").increment(1);
        tracing::debug!("Rejected anonymous caller");
        TodoError::Unauthenticated
    })
}

/// Resolve the caller, load the record and assert the caller owns it.
///
/// Returns the owner together with the record as it was read.
///
/// # Errors
///
/// - [`TodoError::Unauthenticated`] for anonymous callers
/// - [`TodoError::NotFoundOrForbidden`] if the record is missing or owned by
///   another user
/// - [`TodoError::Store`] if the lookup fails
pub async fn authorize<S: TodoStore>(
    store: &S,
    caller: &Caller,
    id: TodoId,
) -> Result<(UserId, Todo)> {
    let user = require_user(caller)?;

    match store.get(id).await? {
        Some(todo) if todo.is_owned_by(user) => Ok((user, todo)),
        found => {
            metrics::counter!("todos.auth_failures", "reason" => "not_found_or_forbidden")
                .increment(1);
            tracing::warn!(
                user_id = %user,
                todo_id = %id,
                exists = found.is_some(),
                "Rejected access to todo"
            );
            Err(TodoError::NotFoundOrForbidden)
        }
    }
}
