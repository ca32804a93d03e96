//! Axum HTTP surface for TodoFlow.
//!
//! Thin imperative shell over [`todoflow_core::TodoService`]:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP shell (Axum)               │  ← identity, JSON, status codes
//! │  - Resolve caller from headers          │  ← correlation IDs, tracing
//! │  - Parse and validate request bodies    │  ← CORS
//! ├─────────────────────────────────────────┤
//! │         TodoService                     │
//! │  - Ownership guard                      │  ← one check for every write
//! │  - Store access                         │
//! │  - Change feed                          │  ← drives the live list
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use todoflow_web::{build_router, AppState, StaticTokenResolver};
//!
//! let state = AppState::new(service, Arc::new(StaticTokenResolver::parse(&tokens)?));
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, CurrentCaller};
pub use identity::{
    IdentityConfigError, IdentityResolver, StaticTokenResolver, TrustedHeaderResolver,
};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
