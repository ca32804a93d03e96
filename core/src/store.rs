//! Todo store trait.
//!
//! Abstracts over the document store holding todo records. The store knows
//! nothing about callers; ownership is enforced one layer up by
//! [`crate::guard`].

use crate::error::Result;
use crate::types::{Todo, TodoId, TodoPatch, UserId};

pub mod memory;

pub use memory::InMemoryTodoStore;

/// Todo store.
///
/// # Implementation Notes
///
/// - `list_by_owner` returns the most recently created record first; records
///   created at the same instant are ordered newest insertion first
/// - `toggle_completed` and `patch` must be atomic read-modify-writes on a
///   single record
/// - Methods that address a record by id return `None`/`false` when it does
///   not exist rather than an error
pub trait TodoStore: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend is unreachable
    /// - A record with the same id already exists
    fn insert(&self, todo: &Todo) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Point lookup by id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    fn get(&self, id: TodoId) -> impl std::future::Future<Output = Result<Option<Todo>>> + Send;

    /// Flip `completed` and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    fn toggle_completed(
        &self,
        id: TodoId,
    ) -> impl std::future::Future<Output = Result<Option<Todo>>> + Send;

    /// Merge the provided fields and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    fn patch(
        &self,
        id: TodoId,
        patch: &TodoPatch,
    ) -> impl std::future::Future<Output = Result<Option<Todo>>> + Send;

    /// Delete by id.
    ///
    /// # Returns
    ///
    /// `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    fn delete(&self, id: TodoId) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Indexed scan of all records owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    fn list_by_owner(
        &self,
        owner: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Todo>>> + Send;

    /// Check the backend is reachable (readiness checks).
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    fn ping(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
