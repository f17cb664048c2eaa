//! Repository factory for runtime backend selection.
//!
//! This module provides a factory for creating the item repository based on
//! environment configuration. It switches between the in-memory (volatile)
//! and `SQLite` (persistent) strategies at startup.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `sqlite`
//! - `DATABASE_URL`: `SQLite` connection URL (default `sqlite://todo.db?mode=rwc`)
//!
//! # Example
//!
//! ```ignore
//! use todo_service::infrastructure::{RepositoryConfig, RepositoryFactory};
//!
//! let repositories = RepositoryFactory::from_env()?.create().await?;
//! let items = repositories.item_repository.list_all().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::{InMemoryItemRepository, ItemRepository, SqliteItemRepository};

/// Database URL used when `STORAGE_MODE=sqlite` and `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo.db?mode=rwc";

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage strategy for todo items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local ordered list with positional ids.
    #[default]
    InMemory,
    /// `SQLite` table with durable keys.
    Sqlite,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" | "volatile" => Ok(Self::InMemory),
            "sqlite" | "sqlite3" | "persistent" => Ok(Self::Sqlite),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage strategy.
    pub storage_mode: StorageMode,
    /// `SQLite` connection URL; [`DEFAULT_DATABASE_URL`] when `None`.
    pub database_url: Option<String>,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `STORAGE_MODE` or `DATABASE_URL`
    /// contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name))
    }

    /// Creates a configuration from a variable lookup shaped like
    /// [`std::env::var`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `STORAGE_MODE` or `DATABASE_URL`
    /// contains an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let storage_mode = match lookup("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        // Empty or whitespace-only counts as unset
        let database_url = lookup("DATABASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let config = Self {
            storage_mode,
            database_url,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidDatabaseUrl` if a database URL is
    /// set but does not use the `sqlite:` scheme.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(url) = &self.database_url
            && !url.starts_with("sqlite:")
        {
            return Err(ConfigurationError::InvalidDatabaseUrl(url.clone()));
        }
        Ok(())
    }

    /// Returns the database URL to connect to.
    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Sqlite)
///     .database_url("sqlite::memory:")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `SQLite` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during factory configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'sqlite'")]
    InvalidStorageMode(String),

    /// Database URL with a scheme other than `sqlite:`.
    #[error("Invalid database URL: '{0}'. Expected a 'sqlite:' URL")]
    InvalidDatabaseUrl(String),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Collection of initialized repositories.
#[derive(Clone)]
pub struct Repositories {
    /// Item repository for the active storage strategy.
    pub item_repository: Arc<dyn ItemRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("item_repository", &"Arc<dyn ItemRepository>")
            .finish()
    }
}

/// Factory for creating the item repository based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates a new repository factory from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Configuration` if environment configuration is invalid.
    pub fn from_env() -> Result<Self, FactoryError> {
        let config = RepositoryConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates the repository selected by the configuration.
    ///
    /// For `SQLite` this opens the database and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::DatabaseConnection` if the database cannot be
    /// opened or migrated.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        let item_repository: Arc<dyn ItemRepository> = match self.config.storage_mode {
            StorageMode::InMemory => Arc::new(InMemoryItemRepository::new()),
            StorageMode::Sqlite => {
                let repository = SqliteItemRepository::connect(self.config.database_url())
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;
                Arc::new(repository)
            }
        };
        Ok(Repositories { item_repository })
    }
}

// =============================================================================
// Tests
// =============================================================================
