//! # TodoFlow Core
//!
//! Domain types and the data-access layer for a per-user todo list.
//!
//! Every read and write goes through [`TodoService`], which takes the caller
//! explicitly and enforces ownership before touching the store:
//!
//! - **list**: the caller's todos, newest first (empty for anonymous callers)
//! - **create**: insert a todo owned by the caller
//! - **toggle**: flip `completed` on one of the caller's todos
//! - **remove**: delete one of the caller's todos
//! - **update**: merge new text, priority or due date into one of the
//!   caller's todos
//!
//! A missing record and a record owned by someone else fail identically with
//! [`TodoError::NotFoundOrForbidden`].
//!
//! ## Example
//!
//! ```ignore
//! use todoflow_core::*;
//! use std::sync::Arc;
//!
//! let service = TodoService::new(Arc::new(InMemoryTodoStore::new()), TodoEnvironment::default());
//! let caller = Caller::User(user_id);
//!
//! let id = service.create(&caller, NewTodo::new("Buy milk", Priority::Low)).await?;
//! service.toggle(&caller, id).await?;
//! let todos = service.list(&caller).await?;
//! ```

pub mod environment;
pub mod error;
pub mod feed;
pub mod filter;
pub mod guard;
pub mod service;
pub mod store;
pub mod types;

pub use environment::{Clock, SystemClock, TodoEnvironment};
pub use error::{Result, TodoError};
pub use feed::{ChangeFeed, TodoChange};
pub use filter::{PriorityFilter, StatusFilter, TodoFilter, TodoStats};
pub use service::TodoService;
pub use store::{InMemoryTodoStore, TodoStore};
pub use types::{Caller, NewTodo, Priority, Todo, TodoId, TodoPatch, UserId};

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
