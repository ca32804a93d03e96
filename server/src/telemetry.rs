//! Tracing and metrics setup.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,todoflow=debug,sqlx=warn,tower_http=info";

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Start the Prometheus exporter on `0.0.0.0:port` and describe the
/// counters the service records.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns error if the recorder is already installed or the listener
/// cannot be set up.
pub fn install_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {e}"))?;

    register_metrics();
    tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}

fn register_metrics() {
    metrics::describe_counter!("todos.created", "Todos created, by priority");
    metrics::describe_counter!("todos.toggled", "Completion flips");
    metrics::describe_counter!("todos.updated", "Todos edited");
    metrics::describe_counter!("todos.removed", "Todos deleted");
    metrics::describe_counter!(
        "todos.auth_failures",
        "Rejected operations, by reason"
    );
    metrics::describe_counter!("todo_store.errors", "Failed store queries, by operation");
}
