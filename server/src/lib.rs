//! TodoFlow server.
//!
//! Wires configuration, the todo store, identity and the HTTP router into a
//! runnable process. See `src/bin/server.rs` for the entry point.

pub mod app;
pub mod config;
pub mod store;
pub mod telemetry;

pub use app::{build_app, build_identity, run, shutdown_signal};
pub use config::{AuthConfig, AuthMode, Config, MetricsConfig, ServerConfig, StoreBackend, StoreConfig};
pub use store::AnyStore;
