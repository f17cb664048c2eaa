//! In-memory repository implementation.
//!
//! Items live in an ordered `Vec` behind a single `RwLock`. Identifiers are
//! positions, recomputed on every read, so deleting an item renumbers every
//! item after it. The collection lives as long as the process.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Description, Item, ItemId};
use crate::infrastructure::{IdentifierSemantics, ItemRepository, RepositoryError};

/// Converts a collection position into a resolved id.
fn position_to_id(position: usize) -> Result<ItemId, RepositoryError> {
    i64::try_from(position)
        .map(ItemId::new)
        .map_err(|_| RepositoryError::DatabaseError(format!("position {position} overflows id")))
}

// =============================================================================
// In-Memory Item Repository
// =============================================================================

/// In-memory implementation of `ItemRepository` with positional ids.
///
/// Cloning shares the underlying collection.
///
/// # Example
///
/// ```ignore
/// use todo_service::infrastructure::InMemoryItemRepository;
///
/// let repository = InMemoryItemRepository::new();
/// repository.create(&Description::parse("first todo.")?).await?;
/// let items = repository.list_all().await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemRepository {
    descriptions: Arc<RwLock<Vec<Description>>>,
}

impl InMemoryItemRepository {
    /// Creates a new empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl ItemRepository for InMemoryItemRepository {
    fn identifier_semantics(&self) -> IdentifierSemantics {
        IdentifierSemantics::Positional
    }

    fn create(&self, description: &Description) -> BoxFuture<'static, Result<Item, RepositoryError>> {
        let descriptions = Arc::clone(&self.descriptions);
        let description = description.clone();
        Box::pin(async move {
            let mut guard = descriptions.write().await;
            let id = position_to_id(guard.len())?;
            guard.push(description.clone());
            Ok(Item::new(id, description))
        })
    }

    fn list_all(&self) -> BoxFuture<'static, Result<Vec<Item>, RepositoryError>> {
        let descriptions = Arc::clone(&self.descriptions);
        Box::pin(async move {
            let guard = descriptions.read().await;
            guard
                .iter()
                .enumerate()
                .map(|(position, description)| {
                    position_to_id(position).map(|id| Item::new(id, description.clone()))
                })
                .collect()
        })
    }

    fn delete_by_id(&self, id: ItemId) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let descriptions = Arc::clone(&self.descriptions);
        Box::pin(async move {
            let mut guard = descriptions.write().await;
            // Bounds are re-checked under the write lock; a concurrent delete
            // may have shrunk the collection since the caller's check.
            let position = id
                .as_position(guard.len())
                .ok_or_else(|| RepositoryError::NotFound(format!("position {id}")))?;
            guard.remove(position);
            Ok(())
        })
    }

    fn count(&self) -> BoxFuture<'static, Result<u64, RepositoryError>> {
        let descriptions = Arc::clone(&self.descriptions);
        Box::pin(async move {
            let guard = descriptions.read().await;
            Ok(guard.len() as u64)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
