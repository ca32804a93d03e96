//! TodoFlow HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, two users
//! TODOFLOW_AUTH_TOKENS="alice-token=8f6c0c9e-2f43-4f8e-9d55-0d1f3a2b7c11" cargo run --bin todoflow
//!
//! # PostgreSQL
//! STORE_BACKEND=postgres DATABASE_URL=postgres://... cargo run --bin todoflow
//! ```

use todoflow_server::{Config, run, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    tracing::info!("Starting TodoFlow server");

    let config = Config::from_env();
    tracing::info!(
        address = %config.bind_address(),
        store = ?config.store.backend,
        auth = ?config.auth.mode,
        metrics = config.metrics.enabled,
        "Configuration loaded"
    );

    run(config).await
}
