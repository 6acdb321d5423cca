//! Environment variable resolution for secrets.
//!
//! Configuration files name the variable that holds a secret through
//! [`EnvKey`]; the value is looked up once at startup, either from the process
//! environment or through a caller-supplied [`EnvResolverFn`].

use crate::errors::AgentError;
use std::fmt;
use std::sync::Arc;

/// A reference to an environment variable or secret key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvKey(String);

impl EnvKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }

    /// Resolves this key from the process environment.
    pub fn resolve(&self) -> Result<String, AgentError> {
        default_env_resolver(&self.0)
    }

    /// Resolves this key with `resolver`, or from the process environment when `None`.
    pub fn resolve_with(&self, resolver: Option<&EnvResolverFn>) -> Result<String, AgentError> {
        match resolver {
            Some(resolver) => resolver(self.key()),
            None => self.resolve(),
        }
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EnvKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EnvKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Custom lookup for secrets, e.g. a vault client.
pub type EnvResolverFn = Arc<dyn Fn(&str) -> Result<String, AgentError> + Send + Sync>;

/// Looks `key` up with `std::env::var`. Unset and empty values are both missing.
pub fn default_env_resolver(key: &str) -> Result<String, AgentError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AgentError::MissingConfiguration {
            field: key.to_string(),
        }),
    }
}
