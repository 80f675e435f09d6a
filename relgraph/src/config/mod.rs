//! Configuration system for relgraph.
//!
//! Configuration is merged from defaults, an optional TOML/YAML/JSON file and
//! `RELGRAPH_`-prefixed environment variables, then validated.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "relgraph.toml",
    "relgraph.yaml",
    "relgraph.yml",
    "relgraph.json",
    ".relgraph/config.toml",
    ".relgraph/config.yaml",
    ".relgraph/config.yml",
    ".relgraph/config.json",
];

/// Environment variable prefix for relgraph configuration.
///
/// Nested keys are separated by a double underscore:
/// `RELGRAPH_AUTH__SECRET` sets `auth.secret`.
pub const ENV_PREFIX: &str = "RELGRAPH_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
