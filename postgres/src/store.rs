use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use todoflow_core::{Priority, Result, Todo, TodoError, TodoId, TodoPatch, TodoStore, UserId};
use uuid::Uuid;

const COLUMNS: &str = "id, owner_id, text, completed, priority, due_date, created_at";

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum open connections
    pub max_connections: u32,
    /// Connections kept open when idle
    pub min_connections: u32,
    /// Time allowed to acquire a connection
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// `PostgreSQL` todo store.
#[derive(Clone, Debug)]
pub struct PostgresTodoStore {
    pool: PgPool,
}

impl PostgresTodoStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if the database cannot be reached.
    pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| TodoError::Store(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self::from_pool(pool))
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Store`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TodoError::Store(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a sqlx error to a store error, counting it per operation.
fn db_error(op: &'static str) -> impl FnOnce(sqlx::Error) -> TodoError {
    move |e| {
        metrics::counter!("todo_store.errors", "op" => op).increment(1);
        tracing::error!(op, error = %e, "Todo store query failed");
        TodoError::Store(format!("Failed to {op} todo: {e}"))
    }
}

fn todo_from_row(row: &PgRow) -> Result<Todo> {
    let read = |e: sqlx::Error| TodoError::Store(format!("Malformed todo row: {e}"));

    let priority: String = row.try_get("priority").map_err(read)?;
    let priority = Priority::parse(&priority)
        .map_err(|_| TodoError::Store(format!("Invalid priority in todo row: {priority}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(Todo {
        id: TodoId::from_uuid(row.try_get::<Uuid, _>("id").map_err(read)?),
        text: row.try_get("text").map_err(read)?,
        completed: row.try_get("completed").map_err(read)?,
        owner_id: UserId(row.try_get::<Uuid, _>("owner_id").map_err(read)?),
        priority,
        due_date: row.try_get("due_date").map_err(read)?,
        created_at,
    })
}

impl TodoStore for PostgresTodoStore {
    async fn insert(&self, todo: &Todo) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO todos (id, owner_id, text, completed, priority, due_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(todo.id.as_uuid())
        .bind(todo.owner_id.0)
        .bind(&todo.text)
        .bind(todo.completed)
        .bind(todo.priority.as_str())
        .bind(todo.due_date)
        .bind(todo.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return TodoError::Store(format!("Todo {} already exists", todo.id));
                }
            }
            db_error("insert")(e)
        })?;

        tracing::debug!(todo_id = %todo.id, owner_id = %todo.owner_id, "Inserted todo row");
        Ok(())
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM todos WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get"))?;

        row.as_ref().map(todo_from_row).transpose()
    }

    async fn toggle_completed(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!(
            "UPDATE todos SET completed = NOT completed WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("toggle"))?;

        row.as_ref().map(todo_from_row).transpose()
    }

    async fn patch(&self, id: TodoId, patch: &TodoPatch) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!(
            r"
            UPDATE todos
            SET text = COALESCE($2, text),
                priority = COALESCE($3, priority),
                due_date = COALESCE($4, due_date)
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(patch.text.as_deref())
        .bind(patch.priority.map(|p| p.as_str()))
        .bind(patch.due_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update"))?;

        row.as_ref().map(todo_from_row).transpose()
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM todos WHERE owner_id = $1 ORDER BY created_at DESC, seq DESC"
        ))
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list"))?;

        rows.iter().map(todo_from_row).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("ping"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.min_connections, 2);
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
    }
}
