//! `SQLite` repository implementation.
//!
//! This module provides the persistent storage strategy using `sqlx` with a
//! `SQLite` connection pool. Every item gets a key assigned once by the
//! database; keys are never renumbered or reused.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     description TEXT NOT NULL
//! );
//! ```

use std::str::FromStr;

use futures::future::BoxFuture;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::domain::{Description, Item, ItemId};
use crate::infrastructure::{IdentifierSemantics, ItemRepository, RepositoryError};

/// Schema applied on connect. `AUTOINCREMENT` keeps deleted keys from being reused.
const CREATE_TODOS_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL
)";

/// Connection cap for file-backed databases.
const MAX_FILE_CONNECTIONS: u32 = 5;

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

/// Returns true if the URL names a private in-memory database.
///
/// Every connection to such a database sees its own copy, so the pool must be
/// pinned to a single connection that is never recycled.
fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

// =============================================================================
// SQLite Item Repository
// =============================================================================

/// `SQLite` implementation of `ItemRepository` with durable ids.
///
/// # Example
///
/// ```ignore
/// use todo_service::infrastructure::SqliteItemRepository;
///
/// let repository = SqliteItemRepository::connect("sqlite://todo.db?mode=rwc").await?;
/// let item = repository.create(&Description::parse("first todo.")?).await?;
/// assert_eq!(item.id.value(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteItemRepository {
    /// Connection pool for `SQLite`.
    pool: SqlitePool,
}

impl SqliteItemRepository {
    /// Creates a new repository over an existing pool.
    ///
    /// The pool is assumed to be migrated; see [`Self::migrate`].
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url`, creating the database file if needed, and
    /// applies the schema.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the URL is invalid, the
    /// database cannot be opened, or the schema cannot be created.
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|error| database_error(&error))?
            .create_if_missing(true);

        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_FILE_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|error| database_error(&error))?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        tracing::info!(url, "SQLite schema ready");
        Ok(repository)
    }

    /// Creates the `todos` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the statement fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TODOS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl ItemRepository for SqliteItemRepository {
    fn identifier_semantics(&self) -> IdentifierSemantics {
        IdentifierSemantics::Durable
    }

    fn create(&self, description: &Description) -> BoxFuture<'static, Result<Item, RepositoryError>> {
        let pool = self.pool.clone();
        let description = description.clone();
        Box::pin(async move {
            let result = sqlx::query("INSERT INTO todos (description) VALUES (?)")
                .bind(description.as_str())
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;
            Ok(Item::new(
                ItemId::new(result.last_insert_rowid()),
                description,
            ))
        })
    }

    fn list_all(&self) -> BoxFuture<'static, Result<Vec<Item>, RepositoryError>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows: Vec<(i64, String)> =
                sqlx::query_as("SELECT id, description FROM todos ORDER BY id ASC")
                    .fetch_all(&pool)
                    .await
                    .map_err(|error| database_error(&error))?;

            rows.into_iter()
                .map(|(id, text)| {
                    Description::parse(text)
                        .map(|description| Item::new(ItemId::new(id), description))
                        .map_err(|error| {
                            RepositoryError::DatabaseError(format!("row {id}: {error}"))
                        })
                })
                .collect()
        })
    }

    fn delete_by_id(&self, id: ItemId) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM todos WHERE id = ?")
                .bind(id.value())
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(format!("todo {id}")));
            }
            Ok(())
        })
    }

    fn count(&self) -> BoxFuture<'static, Result<u64, RepositoryError>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
                .fetch_one(&pool)
                .await
                .map_err(|error| database_error(&error))?;
            u64::try_from(row.0)
                .map_err(|error| RepositoryError::DatabaseError(error.to_string()))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
