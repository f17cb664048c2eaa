//! Storage capability for todo items.
//!
//! This module defines the repository trait shared by every storage strategy.
//! All methods return a boxed future that does nothing until polled. A call
//! is cancelled by dropping its future, which releases any lock guard or
//! pooled connection it holds.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Description, Item, ItemId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Database or storage engine error.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// =============================================================================
// Identifier Semantics
// =============================================================================

/// How a storage strategy resolves item identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSemantics {
    /// Ids are zero-based positions recomputed on every read.
    /// Deleting an item shifts every later item down by one.
    Positional,
    /// Ids are keys assigned once at creation and never reused.
    Durable,
}

// =============================================================================
// Item Repository
// =============================================================================

/// Repository trait for todo items.
///
/// Implementations own the authoritative collection and must tolerate
/// concurrent invocation from request handlers.
pub trait ItemRepository: Send + Sync {
    /// Returns how this repository resolves identifiers.
    fn identifier_semantics(&self) -> IdentifierSemantics;

    /// Appends a new item at the logical end of the collection.
    ///
    /// The returned item carries the id resolved at creation time.
    fn create(&self, description: &Description) -> BoxFuture<'static, Result<Item, RepositoryError>>;

    /// Returns every item in insertion order.
    fn list_all(&self) -> BoxFuture<'static, Result<Vec<Item>, RepositoryError>>;

    /// Removes the item whose resolved id equals `id`.
    ///
    /// Returns `RepositoryError::NotFound` if no such item exists.
    fn delete_by_id(&self, id: ItemId) -> BoxFuture<'static, Result<(), RepositoryError>>;

    /// Counts all items.
    fn count(&self) -> BoxFuture<'static, Result<u64, RepositoryError>>;
}

// =============================================================================
// Tests
// =============================================================================
