//! Server assembly and lifecycle.

use crate::config::{AuthConfig, AuthMode, Config};
use crate::store::AnyStore;
use crate::telemetry;
use std::sync::Arc;
use todoflow_core::{TodoEnvironment, TodoService, TodoStore};
use todoflow_web::{
    AppState, IdentityConfigError, IdentityResolver, StaticTokenResolver, TrustedHeaderResolver,
    build_router,
};
use tokio::signal;
use tracing::{error, info, warn};

/// Build the identity resolver selected by `auth.mode`.
///
/// # Errors
///
/// Returns error if the token table or header name is malformed.
pub fn build_identity(
    auth: &AuthConfig,
) -> Result<Arc<dyn IdentityResolver>, IdentityConfigError> {
    match auth.mode {
        AuthMode::Token => {
            let resolver = StaticTokenResolver::parse(&auth.tokens)?;
            if resolver.is_empty() {
                warn!("No auth tokens configured, every request is anonymous");
            } else {
                info!(tokens = resolver.len(), "Static token identity configured");
            }
            Ok(Arc::new(resolver))
        }
        AuthMode::Header => {
            let resolver = TrustedHeaderResolver::new(&auth.header)?;
            info!(header = %auth.header, "Trusted header identity configured");
            Ok(Arc::new(resolver))
        }
    }
}

/// Assemble the router for a store.
///
/// # Errors
///
/// Returns error if the identity configuration is invalid.
pub fn build_app<S: TodoStore + 'static>(
    store: S,
    auth: &AuthConfig,
) -> Result<axum::Router, IdentityConfigError> {
    let identity = build_identity(auth)?;
    let todos = TodoService::new(Arc::new(store), TodoEnvironment::default());
    Ok(build_router(AppState::new(todos, identity)))
}

/// Run the server until a shutdown signal arrives.
///
/// In-flight requests get `server.shutdown_timeout` to finish once the
/// signal is received; anything still running after that is dropped.
///
/// # Errors
///
/// Returns error if the store, identity provider, metrics exporter or
/// listener cannot be set up, or the server fails while running.
pub async fn run(config: Config) -> anyhow::Result<()> {
    if config.metrics.enabled {
        telemetry::install_metrics(config.metrics.port)?;
    }

    let store = AnyStore::connect(&config.store).await?;
    info!(backend = ?store.backend(), "Todo store ready");

    let app = build_app(store, &config.auth)?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return result?.map_err(Into::into);
        }
        () = shutdown_signal() => {}
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(config.shutdown_timeout(), &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            warn!(
                timeout_secs = config.server.shutdown_timeout,
                "Graceful shutdown timed out, dropping open connections"
            );
            server.abort();
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
