//! Todo item domain model.
//!
//! An item is a short text description plus an identifier whose meaning
//! depends on the storage strategy that resolved it (see
//! [`IdentifierSemantics`](crate::infrastructure::IdentifierSemantics)).

use thiserror::Error;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Identifier of an item as resolved by the active storage strategy.
///
/// For the volatile strategy this is the zero-based position in the current
/// collection; for the persistent strategy it is the stored row key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(i64);

impl ItemId {
    /// Creates an `ItemId` from a raw integer.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Interprets the identifier as a position in a collection of `length` items.
    ///
    /// Returns `None` when the identifier is negative or past the end.
    #[must_use]
    pub fn as_position(self, length: usize) -> Option<usize> {
        usize::try_from(self.0)
            .ok()
            .filter(|position| *position < length)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Errors raised when constructing a [`Description`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    /// The description was empty.
    #[error("description must not be empty")]
    Empty,
}

/// Non-empty item text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Description(String);

impl Description {
    /// Validates and wraps a description.
    ///
    /// # Errors
    ///
    /// Returns `DescriptionError::Empty` if `value` is the empty string.
    pub fn parse(value: impl Into<String>) -> Result<Self, DescriptionError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DescriptionError::Empty);
        }
        Ok(Self(value))
    }

    /// Returns the description as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the description and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Description {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

// =============================================================================
// Item
// =============================================================================

/// A single todo entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Identifier resolved by the storage strategy that produced this item.
    pub id: ItemId,
    /// Text of the entry.
    pub description: Description,
}

impl Item {
    /// Creates a new item.
    #[must_use]
    pub const fn new(id: ItemId, description: Description) -> Self {
        Self { id, description }
    }
}

// =============================================================================
// Tests
// =============================================================================
