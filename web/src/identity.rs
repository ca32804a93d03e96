//! Identity provider boundary.
//!
//! An [`IdentityResolver`] turns request headers into a [`Caller`]. It never
//! fails: missing or unknown credentials resolve to [`Caller::Anonymous`] and
//! each operation decides what an anonymous caller gets.

use axum::http::{HeaderMap, HeaderName, header::AUTHORIZATION};
use std::collections::HashMap;
use thiserror::Error;
use todoflow_core::{Caller, UserId};

/// Default header set by an authenticating proxy.
pub const DEFAULT_USER_HEADER: &str = "X-Authenticated-User";

/// Resolves the caller of a request.
pub trait IdentityResolver: Send + Sync {
    /// Resolve the caller from request headers.
    fn resolve(&self, headers: &HeaderMap) -> Caller;
}

/// Invalid identity configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityConfigError {
    /// An entry is not of the form `token=user-id`
    #[error("Malformed token entry '{0}', expected token=user-id")]
    MalformedEntry(String),

    /// The user id of an entry is not a UUID
    #[error("Invalid user id for token '{token}': {value}")]
    InvalidUserId {
        /// Token the entry maps
        token: String,
        /// Offending user id
        value: String,
    },

    /// The header name is not a valid HTTP header
    #[error("Invalid header name '{0}'")]
    InvalidHeaderName(String),
}

/// Bearer token from an `Authorization: Bearer <token>` header, if present.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Maps bearer tokens to users from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenResolver {
    /// Build a resolver from `(token, user)` pairs.
    #[must_use]
    pub fn new(tokens: impl IntoIterator<Item = (String, UserId)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Parse a `token=user-id,token2=user-id2` table.
    ///
    /// Blank entries are skipped, so an empty string yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityConfigError`] if an entry is malformed or a user id
    /// is not a UUID.
    pub fn parse(table: &str) -> Result<Self, IdentityConfigError> {
        let mut tokens = HashMap::new();

        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, user) = entry
                .split_once('=')
                .map(|(t, u)| (t.trim(), u.trim()))
                .filter(|(t, _)| !t.is_empty())
                .ok_or_else(|| IdentityConfigError::MalformedEntry(entry.to_string()))?;

            let user: UserId = user.parse().map_err(|_| IdentityConfigError::InvalidUserId {
                token: token.to_string(),
                value: user.to_string(),
            })?;
            tokens.insert(token.to_string(), user);
        }

        Ok(Self { tokens })
    }

    /// Number of configured tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no tokens are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityResolver for StaticTokenResolver {
    fn resolve(&self, headers: &HeaderMap) -> Caller {
        bearer_token(headers)
            .and_then(|token| self.tokens.get(token).copied())
            .into()
    }
}

/// Trusts a user id header set by an authenticating reverse proxy.
///
/// Only deploy behind a proxy that strips this header from client requests.
#[derive(Debug, Clone)]
pub struct TrustedHeaderResolver {
    header: HeaderName,
}

impl TrustedHeaderResolver {
    /// Trust `header`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityConfigError::InvalidHeaderName`] if `header` is not a
    /// valid header name.
    pub fn new(header: &str) -> Result<Self, IdentityConfigError> {
        HeaderName::try_from(header)
            .map(|header| Self { header })
            .map_err(|_| IdentityConfigError::InvalidHeaderName(header.to_string()))
    }
}

impl Default for TrustedHeaderResolver {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static("x-authenticated-user"),
        }
    }
}

impl IdentityResolver for TrustedHeaderResolver {
    fn resolve(&self, headers: &HeaderMap) -> Caller {
        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<UserId>().ok())
            .into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use todoflow_testing::{alice, bob};

    fn headers(name: &str, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::try_from(name).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        map
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert_eq!(bearer_token(&headers("authorization", "Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("authorization", "Basic abc")), None);
        assert_eq!(bearer_token(&headers("authorization", "Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn static_tokens_resolve_known_users_only() {
        let resolver = StaticTokenResolver::parse(&format!("a-token={},b-token={}", alice(), bob()))
            .unwrap();

        assert_eq!(resolver.len(), 2);
        assert_eq!(
            resolver.resolve(&headers("authorization", "Bearer a-token")),
            Caller::User(alice())
        );
        assert_eq!(
            resolver.resolve(&headers("authorization", "Bearer nope")),
            Caller::Anonymous
        );
        assert_eq!(resolver.resolve(&HeaderMap::new()), Caller::Anonymous);
    }

    #[test]
    fn static_token_table_errors() {
        assert!(StaticTokenResolver::parse("").unwrap().is_empty());
        assert_eq!(
            StaticTokenResolver::parse("no-equals").unwrap_err(),
            IdentityConfigError::MalformedEntry("no-equals".to_string())
        );
        assert!(matches!(
            StaticTokenResolver::parse("tok=not-a-uuid").unwrap_err(),
            IdentityConfigError::InvalidUserId { .. }
        ));
    }

    #[test]
    fn trusted_header_reads_user_id() {
        let resolver = TrustedHeaderResolver::default();

        assert_eq!(
            resolver.resolve(&headers(DEFAULT_USER_HEADER, &alice().to_string())),
            Caller::User(alice())
        );
        assert_eq!(
            resolver.resolve(&headers(DEFAULT_USER_HEADER, "garbage")),
            Caller::Anonymous
        );
    }

    #[test]
    fn trusted_header_name_is_configurable() {
        let resolver = TrustedHeaderResolver::new("X-Remote-User").unwrap();
        assert_eq!(
            resolver.resolve(&headers("x-remote-user", &bob().to_string())),
            Caller::User(bob())
        );
        assert!(TrustedHeaderResolver::new("bad header").is_err());
    }
}
