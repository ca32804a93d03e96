//! Data-access layer.
//!
//! [`TodoService`] mediates every read and write to the todo store. Each
//! operation takes the caller explicitly, resolves it to a user, checks
//! ownership through [`crate::guard`] and then performs a single store call.
//!
//! | Operation | Anonymous caller        | Foreign / missing record |
//! |-----------|-------------------------|--------------------------|
//! | `list`    | empty list              | n/a                      |
//! | `create`  | `Unauthenticated`       | n/a                      |
//! | `toggle`  | `Unauthenticated`       | `NotFoundOrForbidden`    |
//! | `remove`  | `Unauthenticated`       | `NotFoundOrForbidden`    |
//! | `update`  | `Unauthenticated`       | `NotFoundOrForbidden`    |
//!
//! Successful mutations are published on the owner's [`ChangeFeed`].

use crate::environment::TodoEnvironment;
use crate::error::{Result, TodoError};
use crate::feed::{ChangeFeed, TodoChange};
use crate::guard;
use crate::store::TodoStore;
use crate::types::{Caller, NewTodo, Todo, TodoId, TodoPatch};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Todo data-access service.
pub struct TodoService<S> {
    store: Arc<S>,
    env: TodoEnvironment,
    feed: ChangeFeed,
}

impl<S> Clone for TodoService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            env: self.env.clone(),
            feed: self.feed.clone(),
        }
    }
}

impl<S: TodoStore> TodoService<S> {
    /// Creates a service over `store` with its own change feed.
    #[must_use]
    pub fn new(store: Arc<S>, env: TodoEnvironment) -> Self {
        Self::with_feed(store, env, ChangeFeed::new())
    }

    /// Creates a service publishing to an existing change feed.
    #[must_use]
    pub const fn with_feed(store: Arc<S>, env: TodoEnvironment, feed: ChangeFeed) -> Self {
        Self { store, env, feed }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// All todos owned by the caller, most recently created first.
    ///
    /// Anonymous callers get an empty list so an unauthenticated client can
    /// render its empty state.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store query fails.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Todo>> {
        let Some(owner) = caller.user_id() else {
            debug!("Anonymous list request, returning empty list");
            return Ok(Vec::new());
        };

        let todos = self.store.list_by_owner(owner).await?;
        debug!(owner_id = %owner, count = todos.len(), "Listed todos");
        Ok(todos)
    }

    /// Create a todo owned by the caller and return its id.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Unauthenticated`] for anonymous callers
    /// - [`TodoError::Store`] if the insert fails
    pub async fn create(&self, caller: &Caller, draft: NewTodo) -> Result<TodoId> {
        let owner = guard::require_user(caller)?;

        let todo = Todo::new(TodoId::new(), owner, draft, self.env.clock.now());
        let id = todo.id;
        self.store.insert(&todo).await?;

        metrics::counter!("todos.created", "priority" => todo.priority.as_str()).increment(1);
        info!(owner_id = %owner, todo_id = %id, priority = %todo.priority, "Todo created");

        self.feed.publish(owner, TodoChange::Created { id }).await;
        Ok(id)
    }

    /// Flip the completion flag of one of the caller's todos.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Unauthenticated`] for anonymous callers
    /// - [`TodoError::NotFoundOrForbidden`] if the todo is missing or foreign
    /// - [`TodoError::Store`] if the write fails
    pub async fn toggle(&self, caller: &Caller, id: TodoId) -> Result<Todo> {
        let (owner, _) = guard::authorize(&*self.store, caller, id).await?;

        // A concurrent remove between the guard read and this write
        // surfaces as not found.
        let todo = self
            .store
            .toggle_completed(id)
            .await?
            .ok_or(TodoError::NotFoundOrForbidden)?;

        metrics::counter!("todos.toggled").increment(1);
        info!(owner_id = %owner, todo_id = %id, completed = todo.completed, "Todo toggled");

        self.feed
            .publish(
                owner,
                TodoChange::Toggled {
                    id,
                    completed: todo.completed,
                },
            )
            .await;
        Ok(todo)
    }

    /// Permanently delete one of the caller's todos.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Unauthenticated`] for anonymous callers
    /// - [`TodoError::NotFoundOrForbidden`] if the todo is missing, foreign or
    ///   already deleted
    /// - [`TodoError::Store`] if the delete fails
    pub async fn remove(&self, caller: &Caller, id: TodoId) -> Result<()> {
        let (owner, _) = guard::authorize(&*self.store, caller, id).await?;

        if !self.store.delete(id).await? {
            return Err(TodoError::NotFoundOrForbidden);
        }

        metrics::counter!("todos.removed").increment(1);
        info!(owner_id = %owner, todo_id = %id, "Todo removed");

        self.feed.publish(owner, TodoChange::Removed { id }).await;
        Ok(())
    }

    /// Merge the provided fields into one of the caller's todos.
    ///
    /// Omitted fields keep their stored value. An empty patch still performs
    /// the ownership check and returns the record unchanged.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Unauthenticated`] for anonymous callers
    /// - [`TodoError::NotFoundOrForbidden`] if the todo is missing or foreign
    /// - [`TodoError::Store`] if the write fails
    pub async fn update(&self, caller: &Caller, id: TodoId, patch: TodoPatch) -> Result<Todo> {
        let (owner, current) = guard::authorize(&*self.store, caller, id).await?;

        if patch.is_empty() {
            debug!(owner_id = %owner, todo_id = %id, "Empty patch, nothing to update");
            return Ok(current);
        }

        let todo = self
            .store
            .patch(id, &patch)
            .await?
            .ok_or(TodoError::NotFoundOrForbidden)?;

        metrics::counter!("todos.updated").increment(1);
        info!(
            owner_id = %owner,
            todo_id = %id,
            text = patch.text.is_some(),
            priority = patch.priority.is_some(),
            due_date = patch.due_date.is_some(),
            "Todo updated"
        );

        self.feed.publish(owner, TodoChange::Updated { id }).await;
        Ok(todo)
    }

    /// Subscribe to change notifications for the caller's todos.
    ///
    /// Returns `None` for anonymous callers; their list never changes.
    pub async fn watch(&self, caller: &Caller) -> Option<broadcast::Receiver<TodoChange>> {
        match caller.user_id() {
            Some(owner) => Some(self.feed.subscribe(owner).await),
            None => None,
        }
    }

    /// Check the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the store is unreachable.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

impl<S> std::fmt::Debug for TodoService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService")
            .field("env", &self.env)
            .field("feed", &self.feed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryTodoStore;
    use crate::types::{Priority, UserId};
    use uuid::Uuid;

    fn service() -> TodoService<InMemoryTodoStore> {
        TodoService::new(Arc::new(InMemoryTodoStore::new()), TodoEnvironment::default())
    }

    #[tokio::test]
    async fn empty_patch_returns_record_without_notifying() {
        let svc = service();
        let owner = Caller::User(UserId(Uuid::new_v4()));
        let id = svc
            .create(&owner, NewTodo::new("keep", Priority::Medium))
            .await
            .unwrap();
        let mut rx = svc.watch(&owner).await.unwrap();

        let todo = svc.update(&owner, id, TodoPatch::default()).await.unwrap();

        assert_eq!(todo.text, "keep");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_mutation_publishes_nothing() {
        let svc = service();
        let owner = Caller::User(UserId(Uuid::new_v4()));
        let mut rx = svc.watch(&owner).await.unwrap();

        let err = svc.toggle(&owner, TodoId::new()).await.unwrap_err();

        assert_eq!(err, TodoError::NotFoundOrForbidden);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn anonymous_cannot_watch() {
        assert!(service().watch(&Caller::Anonymous).await.is_none());
    }

    #[tokio::test]
    async fn ping_reaches_store() {
        service().ping().await.unwrap();
    }
}
