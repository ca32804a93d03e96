//! `PostgreSQL` todo store for TodoFlow.
//!
//! Implements [`TodoStore`](todoflow_core::TodoStore) over a `todos` table:
//!
//! - Owner-scoped listing served by the `(owner_id, created_at DESC, seq DESC)` index
//! - Single-statement `toggle_completed` and `patch` (atomic per row)
//! - Connection pooling via sqlx
//!
//! # Example
//!
//! ```ignore
//! use todoflow_postgres::{PoolSettings, PostgresTodoStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresTodoStore::connect("postgres://localhost/todoflow", PoolSettings::default()).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

mod store;

pub use store::{PoolSettings, PostgresTodoStore};
