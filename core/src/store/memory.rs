//! In-memory todo store.
//!
//! Backs the development server and the test suites. All access is
//! serialized behind one mutex, so `toggle_completed` and `patch` are atomic.

use crate::error::{Result, TodoError};
use crate::store::TodoStore;
use crate::types::{Todo, TodoId, TodoPatch, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    /// Record plus its insertion sequence number (tie-breaker for ordering)
    todos: HashMap<TodoId, (Todo, u64)>,
    next_seq: u64,
}

/// In-memory todo store.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTodoStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all owners (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.todos.len())
    }

    /// Returns `true` if no records are stored.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.todos.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| TodoError::Store("Mutex lock failed".to_string()))
    }
}

impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, todo: &Todo) -> Result<()> {
        let mut inner = self.lock()?;

        if inner.todos.contains_key(&todo.id) {
            return Err(TodoError::Store(format!("Todo {} already exists", todo.id)));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.todos.insert(todo.id, (todo.clone(), seq));
        Ok(())
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.lock()?.todos.get(&id).map(|(todo, _)| todo.clone()))
    }

    async fn toggle_completed(&self, id: TodoId) -> Result<Option<Todo>> {
        let mut inner = self.lock()?;
        Ok(inner.todos.get_mut(&id).map(|(todo, _)| {
            todo.toggle();
            todo.clone()
        }))
    }

    async fn patch(&self, id: TodoId, patch: &TodoPatch) -> Result<Option<Todo>> {
        let mut inner = self.lock()?;
        Ok(inner.todos.get_mut(&id).map(|(todo, _)| {
            patch.apply_to(todo);
            todo.clone()
        }))
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        Ok(self.lock()?.todos.remove(&id).is_some())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Todo>> {
        let inner = self.lock()?;

        let mut owned: Vec<(&Todo, u64)> = inner
            .todos
            .values()
            .filter(|(todo, _)| todo.owner_id == owner)
            .map(|(todo, seq)| (todo, *seq))
            .collect();

        owned.sort_by(|(a, a_seq), (b, b_seq)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        Ok(owned.into_iter().map(|(todo, _)| todo.clone()).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{NewTodo, Priority};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn todo(owner: UserId, text: &str, at: chrono::DateTime<Utc>) -> Todo {
        Todo::new(TodoId::new(), owner, NewTodo::new(text, Priority::Medium), at)
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = InMemoryTodoStore::new();
        let owner = UserId(Uuid::new_v4());
        let record = todo(owner, "Buy milk", Utc::now());

        store.insert(&record).await.unwrap();

        assert_eq!(store.get(record.id).await.unwrap(), Some(record));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryTodoStore::new();
        let record = todo(UserId(Uuid::new_v4()), "Once", Utc::now());

        store.insert(&record).await.unwrap();
        let err = store.insert(&record).await.unwrap_err();

        assert!(matches!(err, TodoError::Store(_)));
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner_and_newest_first() {
        let store = InMemoryTodoStore::new();
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());
        let t0 = Utc::now();

        let older = todo(alice, "older", t0);
        let newer = todo(alice, "newer", t0 + Duration::seconds(5));
        let foreign = todo(bob, "bob's", t0 + Duration::seconds(10));

        store.insert(&older).await.unwrap();
        store.insert(&foreign).await.unwrap();
        store.insert(&newer).await.unwrap();

        let listed = store.list_by_owner(alice).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn same_timestamp_orders_by_insertion() {
        let store = InMemoryTodoStore::new();
        let owner = UserId(Uuid::new_v4());
        let at = Utc::now();

        for text in ["first", "second", "third"] {
            store.insert(&todo(owner, text, at)).await.unwrap();
        }

        let listed = store.list_by_owner(owner).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn toggle_and_patch_missing_record_return_none() {
        let store = InMemoryTodoStore::new();
        let id = TodoId::new();

        assert_eq!(store.toggle_completed(id).await.unwrap(), None);
        assert_eq!(
            store.patch(id, &TodoPatch::default()).await.unwrap(),
            None
        );
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryTodoStore::new();
        let record = todo(UserId(Uuid::new_v4()), "gone", Utc::now());
        store.insert(&record).await.unwrap();

        assert!(store.delete(record.id).await.unwrap());
        assert!(store.is_empty().unwrap());
        assert_eq!(store.get(record.id).await.unwrap(), None);
    }
}
