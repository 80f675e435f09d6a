//! Configuration builder.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating RelgraphConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: RelgraphConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: RelgraphConfig::default(),
        }
    }

    /// Use the in-memory document store
    pub fn with_memory_storage(mut self) -> Self {
        self.config.storage.engine = StorageEngine::Memory;
        self
    }

    /// Require bearer tokens signed with `secret`.
    pub fn with_auth_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.enabled = true;
        self.config.auth.secret = secret.into();
        self
    }

    /// Accept requests without a token.
    pub fn without_auth(mut self) -> Self {
        self.config.auth.enabled = false;
        self
    }

    pub fn with_token_leeway(mut self, secs: u64) -> Self {
        self.config.auth.leeway_secs = secs;
        self
    }

    /// Set search page sizes.
    pub fn with_page_size(mut self, default_per_page: usize, max_per_page: usize) -> Self {
        self.config.search.default_per_page = default_per_page;
        self.config.search.max_per_page = max_per_page;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use default logging configuration (JSON console output at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None;
        self
    }

    /// Create a configuration for development.
    ///
    /// - In-memory storage
    /// - No token checks
    /// - Debug-level logging
    pub fn development() -> Self {
        Self::new()
            .with_memory_storage()
            .without_auth()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration for automated tests: development settings with
    /// warnings only and no stdout noise.
    pub fn testing() -> Self {
        let mut builder = Self::development().with_log_level(LogLevel::Warn);
        builder.config.logging.stdout = false;
        builder
    }

    /// Create a production configuration.
    ///
    /// Token checks are enabled, so `build` fails until a secret is set with
    /// [`with_auth_secret`](Self::with_auth_secret).
    pub fn production() -> Self {
        let mut builder = Self::new().with_memory_storage().with_default_logging();
        builder.config.auth.enabled = true;
        builder
    }

    /// Default configuration suitable for embedding: in-memory storage,
    /// console logging and no token checks.
    pub fn defaults() -> Self {
        Self::new().with_memory_storage().with_default_logging()
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<RelgraphConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
