//! Runtime selection of the todo store.

use crate::config::{StoreBackend, StoreConfig};
use todoflow_core::{InMemoryTodoStore, Result, Todo, TodoId, TodoPatch, TodoStore, UserId};
use todoflow_postgres::PostgresTodoStore;

/// The store the server was configured with.
///
/// [`TodoStore`] is not object safe, so the backend is picked once at
/// startup and dispatched through this enum.
#[derive(Debug, Clone)]
pub enum AnyStore {
    /// Process-local store
    Memory(InMemoryTodoStore),
    /// `PostgreSQL` store
    Postgres(PostgresTodoStore),
}

impl AnyStore {
    /// Open the configured backend.
    ///
    /// The `PostgreSQL` backend is migrated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be reached or migrated.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory todo store, data is lost on restart");
                Ok(Self::Memory(InMemoryTodoStore::new()))
            }
            StoreBackend::Postgres => {
                let store = PostgresTodoStore::connect(&config.url, config.pool_settings()).await?;
                store.migrate().await?;
                tracing::info!("Database migrations applied");
                Ok(Self::Postgres(store))
            }
        }
    }

    /// Backend name for logs and readiness output.
    #[must_use]
    pub const fn backend(&self) -> StoreBackend {
        match self {
            Self::Memory(_) => StoreBackend::Memory,
            Self::Postgres(_) => StoreBackend::Postgres,
        }
    }
}

impl TodoStore for AnyStore {
    async fn insert(&self, todo: &Todo) -> Result<()> {
        match self {
            Self::Memory(store) => store.insert(todo).await,
            Self::Postgres(store) => store.insert(todo).await,
        }
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        match self {
            Self::Memory(store) => store.get(id).await,
            Self::Postgres(store) => store.get(id).await,
        }
    }

    async fn toggle_completed(&self, id: TodoId) -> Result<Option<Todo>> {
        match self {
            Self::Memory(store) => store.toggle_completed(id).await,
            Self::Postgres(store) => store.toggle_completed(id).await,
        }
    }

    async fn patch(&self, id: TodoId, patch: &TodoPatch) -> Result<Option<Todo>> {
        match self {
            Self::Memory(store) => store.patch(id, patch).await,
            Self::Postgres(store) => store.patch(id, patch).await,
        }
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        match self {
            Self::Memory(store) => store.delete(id).await,
            Self::Postgres(store) => store.delete(id).await,
        }
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Todo>> {
        match self {
            Self::Memory(store) => store.list_by_owner(owner).await,
            Self::Postgres(store) => store.list_by_owner(owner).await,
        }
    }

    async fn ping(&self) -> Result<()> {
        match self {
            Self::Memory(store) => store.ping().await,
            Self::Postgres(store) => store.ping().await,
        }
    }
}
