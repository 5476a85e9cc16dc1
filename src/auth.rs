//! Bearer token sources.
//!
//! Token storage belongs to the embedding application; the client only asks
//! a [`TokenProvider`] for the current token right before dispatch.

use keyring::Entry;
use std::sync::{Arc, RwLock};

pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` when the user is not signed in.
    fn token(&self) -> Option<String>;
}

/// Never yields a token.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

/// Token held in memory; replaceable after sign-in or sign-out.
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<String>>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|t| !t.is_empty())
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new("SST_AUTH_TOKEN")
    }
}

impl TokenProvider for EnvToken {
    fn token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.is_empty())
    }
}

/// OS keyring entry, falling back to an environment variable.
#[derive(Debug, Clone)]
pub struct KeyringToken {
    service: String,
    user: String,
    fallback: EnvToken,
}

impl KeyringToken {
    pub fn new(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
            fallback: EnvToken::default(),
        }
    }

    pub fn with_env_fallback(mut self, var: impl Into<String>) -> Self {
        self.fallback = EnvToken::new(var);
        self
    }
}

impl TokenProvider for KeyringToken {
    fn token(&self) -> Option<String> {
        if let Ok(entry) = Entry::new(&self.service, &self.user) {
            if let Some(token) = entry.get_password().ok().filter(|t| !t.is_empty()) {
                return Some(token);
            }
        }
        self.fallback.token()
    }
}

pub fn no_token() -> Arc<dyn TokenProvider> {
    Arc::new(NoToken)
}
