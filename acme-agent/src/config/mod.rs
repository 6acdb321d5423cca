//! Agent configuration.
//!
//! [`AgentConfig`] is assembled once at startup from an optional YAML file and
//! environment overrides, validated, then handed to the components that need
//! it. Nothing downstream of startup reads the environment.

pub mod env_resolver;
pub mod loader;
pub mod types;

pub use env_resolver::{default_env_resolver, EnvKey, EnvResolverFn};
pub use loader::CONFIG_PATH_ENV;
pub use types::*;
