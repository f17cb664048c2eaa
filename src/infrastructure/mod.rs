//! Infrastructure module for storage.
//!
//! This module contains the item repository trait, its in-memory and
//! `SQLite` implementations, and the factory that selects a backend at
//! startup.

pub mod factory;
pub mod in_memory;
pub mod repository;
pub mod sqlite;

pub use factory::{
    ConfigurationError, DEFAULT_DATABASE_URL, FactoryError, Repositories, RepositoryConfig,
    RepositoryConfigBuilder, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryItemRepository;
pub use repository::{IdentifierSemantics, ItemRepository, RepositoryError};
pub use sqlite::SqliteItemRepository;
