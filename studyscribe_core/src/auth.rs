use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::error::TranscriptError;

/// Caller identity resolved from a bearer token. The engine and its
/// collaborators only ever see this, never the credential itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Authenticator: Send + Sync {
    /// `bearer` is the raw `Authorization` header value, if any.
    fn authenticate(&self, bearer: Option<&str>) -> Result<CallerIdentity, TranscriptError>;
}

/// Fixed token table, mainly for tests and single-user deployments.
pub struct StaticTokenAuthenticator {
    tokens: Mutex<HashMap<String, CallerIdentity>>,
}

impl StaticTokenAuthenticator {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_token(self, token: impl Into<String>, identity: impl Into<String>) -> Self {
        self.insert(token, identity);
        self
    }

    pub fn insert(&self, token: impl Into<String>, identity: impl Into<String>) {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), CallerIdentity::new(identity));
    }
}

impl Default for StaticTokenAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, bearer: Option<&str>) -> Result<CallerIdentity, TranscriptError> {
        let token = bearer
            .and_then(strip_bearer)
            .ok_or(TranscriptError::Unauthenticated)?;
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(TranscriptError::Unauthenticated)
    }
}

/// Resolves every caller to one local identity (CLI use).
#[derive(Debug, Clone)]
pub struct AnonymousAuthenticator {
    identity: CallerIdentity,
}

impl AnonymousAuthenticator {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: CallerIdentity::new(identity),
        }
    }
}

impl Default for AnonymousAuthenticator {
    fn default() -> Self {
        Self::new("local")
    }
}

impl Authenticator for AnonymousAuthenticator {
    fn authenticate(&self, _bearer: Option<&str>) -> Result<CallerIdentity, TranscriptError> {
        Ok(self.identity.clone())
    }
}

/// Accepts `Bearer <token>` (any case) or a bare token.
fn strip_bearer(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None => header,
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
