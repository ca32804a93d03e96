//! Application state for Axum handlers.

use crate::identity::IdentityResolver;
use std::sync::Arc;
use todoflow_core::TodoService;

/// Application state shared across all HTTP handlers.
///
/// Generic over the todo store so the server can pick a backend at startup.
/// Cloning is cheap (every field is reference counted).
pub struct AppState<S> {
    /// Data-access service
    pub todos: TodoService<S>,
    /// Resolves the caller of each request
    pub identity: Arc<dyn IdentityResolver>,
}

impl<S> AppState<S> {
    /// Create a new application state.
    #[must_use]
    pub fn new(todos: TodoService<S>, identity: Arc<dyn IdentityResolver>) -> Self {
        Self { todos, identity }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            todos: self.todos.clone(),
            identity: Arc::clone(&self.identity),
        }
    }
}
