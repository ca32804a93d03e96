//! Custom Axum extractors.
//!
//! - `CorrelationId`: Extract or generate request correlation IDs
//! - `CurrentCaller`: Resolve the caller through the configured identity provider
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState<S>>,
//!     correlation_id: CorrelationId,
//!     CurrentCaller(caller): CurrentCaller,
//! ) -> Result<Json<Vec<Todo>>, AppError> {
//!     tracing::debug!(correlation_id = %correlation_id.0, "Listing todos");
//!     Ok(Json(state.todos.list(&caller).await?))
//! }
//! ```

use crate::middleware::CORRELATION_ID_HEADER;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use todoflow_core::Caller;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Reads the ID stored by the correlation-id middleware, then the
/// `X-Correlation-ID` header, and generates a new UUID v4 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// The caller of the current request.
///
/// Never rejects: unresolvable credentials yield [`Caller::Anonymous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCaller(pub Caller);

#[async_trait]
impl<S> FromRequestParts<AppState<S>> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let caller = state.identity.resolve(&parts.headers);
        if !caller.is_authenticated() {
            tracing::debug!("Request resolved to anonymous caller");
        }
        Ok(Self(caller))
    }
}
