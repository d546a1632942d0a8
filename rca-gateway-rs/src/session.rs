// rca-gateway-rs/src/session.rs
// Binds browsing contexts (cookie tokens) to stable session ids.

use std::sync::Arc;

use axum::http::{header::COOKIE, HeaderMap};
use dashmap::DashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "rca_session";

/// Outcome of resolving a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub context: String,
    pub session_id: String,
    /// The context token was minted by this call and must be sent to the client.
    pub issued: bool,
}

impl ResolvedSession {
    pub fn set_cookie(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.context)
    }
}

/// Lookup-or-create store of context token -> session id.
///
/// Bindings live for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    bindings: Arc<DashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session for a context token minted by this store.
    ///
    /// Missing or unknown tokens are never bound as-is; a fresh token is
    /// minted instead and flagged for the client.
    pub fn resolve(&self, context: Option<&str>) -> ResolvedSession {
        if let Some(existing) = context.map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(id) = self.bindings.get(existing) {
                return ResolvedSession {
                    context: existing.to_string(),
                    session_id: id.value().clone(),
                    issued: false,
                };
            }
            tracing::debug!("unknown session token, issuing a new one");
        }

        let context = Uuid::new_v4().to_string();
        let session_id = Uuid::new_v4().to_string();
        self.bindings.insert(context.clone(), session_id.clone());
        tracing::debug!(session_id = %session_id, "new session bound");

        ResolvedSession {
            context,
            session_id,
            issued: true,
        }
    }

    pub fn session_for(&self, context: &str) -> Option<String> {
        self.bindings.get(context).map(|id| id.value().clone())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Read the session cookie from request headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn same_context_resolves_to_same_session() {
        let store = SessionStore::new();
        let first = store.resolve(None);
        assert!(first.issued);

        let again = store.resolve(Some(&first.context));
        assert!(!again.issued);
        assert_eq!(again.session_id, first.session_id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_context_gets_a_fresh_token() {
        let store = SessionStore::new();
        let resolved = store.resolve(Some("stale-token"));
        assert!(resolved.issued);
        assert_ne!(resolved.context, "stale-token");
        assert_eq!(store.session_for("stale-token"), None);
        assert_eq!(store.session_for(&resolved.context), Some(resolved.session_id));
    }

    #[test]
    fn forged_tokens_are_not_bound() {
        let store = SessionStore::new();
        let long = "x".repeat(4000);
        for i in 0..100 {
            let forged = format!("forged-{}", i);
            assert!(store.resolve(Some(&forged)).issued);
        }
        let resolved = store.resolve(Some(&long));

        assert!(resolved.issued);
        assert_eq!(resolved.context.len(), 36);
        assert_eq!(store.session_for(&long), None);
        assert_eq!(store.len(), 101);
    }

    #[test]
    fn distinct_contexts_get_distinct_sessions() {
        let store = SessionStore::new();
        let a = store.resolve(None);
        let b = store.resolve(None);
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; rca_session=abc-123; other=1"),
        );
        assert_eq!(session_cookie(&headers), Some("abc-123"));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("rca_sessionx=nope"));
        assert_eq!(session_cookie(&headers), None);
    }
}
