//! HTTP handlers for the todo service.
//!
//! Each handler validates its input completely before touching storage and
//! converts every failure into a status response. No handler holds state
//! between requests. A client that disconnects drops the handler future, and
//! with it any storage call still in flight.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::dto::{ItemResponse, Payload, ResponseStyle};
use super::error::ApiErrorResponse;
use super::render::HtmlTemplate;
use crate::domain::ItemId;
use crate::infrastructure::{IdentifierSemantics, ItemRepository, Repositories, RepositoryError};

/// Status message for a positional id outside the collection.
pub const OUT_OF_BOUNDS: &str = "id out of bounds";

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses a trait object so the storage strategy can be chosen at startup.
#[derive(Clone)]
pub struct AppState {
    /// Item repository for the active storage strategy.
    pub repository: Arc<dyn ItemRepository>,
    /// Page template, loaded once at startup.
    pub template: Arc<HtmlTemplate>,
}

impl AppState {
    /// Creates a new `AppState`.
    #[must_use]
    pub fn new(repository: Arc<dyn ItemRepository>, template: HtmlTemplate) -> Self {
        Self {
            repository,
            template: Arc::new(template),
        }
    }

    /// Creates a new `AppState` from the repositories built by
    /// `RepositoryFactory::create()`.
    #[must_use]
    pub fn from_repositories(repositories: Repositories, template: HtmlTemplate) -> Self {
        Self::new(repositories.item_repository, template)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("repository", &self.repository.identifier_semantics())
            .field("template", &"HtmlTemplate")
            .finish()
    }
}

// =============================================================================
// GET / and GET /view
// =============================================================================

/// Renders the HTML page listing every item.
///
/// # Errors
///
/// Returns a 500 response if the items cannot be read.
pub async fn index_page(State(state): State<AppState>) -> Result<Html<String>, ApiErrorResponse> {
    let items = state.repository.list_all().await?;
    Ok(Html(state.template.render(&items)))
}

/// Returns every item as a JSON array of `{"ID", "Description"}` objects.
///
/// An empty collection is `[]`.
///
/// # Errors
///
/// Returns a 500 response if the items cannot be read.
pub async fn view_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemResponse>>, ApiErrorResponse> {
    let items = state.repository.list_all().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

// =============================================================================
// POST /save
// =============================================================================

/// Appends a new item.
///
/// # Request Body
///
/// `description=<text>` (form) or `{"description": "<text>"}` (JSON).
///
/// # Response
///
/// - **303 See Other** to `/` for forms, **200 OK** for JSON
/// - **400 Bad Request**: description missing or empty
/// - **500 Internal Server Error**: storage error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the failures listed above.
pub async fn save_item(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Response, ApiErrorResponse> {
    let description = payload.description()?;

    let item = state.repository.create(&description).await?;
    tracing::info!(id = %item.id, "Item saved");

    Ok(mutation_response(payload.response_style()))
}

// =============================================================================
// POST|DELETE /delete
// =============================================================================

/// Removes one item by its resolved id.
///
/// # Request Body
///
/// `id=<int>` (form) or `{"id": <int>}` (JSON).
///
/// # Response
///
/// - **303 See Other** to `/` for forms, **200 OK** for JSON
/// - **400 Bad Request**: id missing, not an integer, or (positional ids)
///   out of bounds
/// - **404 Not Found**: (durable ids) no item with that key
/// - **500 Internal Server Error**: storage error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the failures listed above.
pub async fn delete_item(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Response, ApiErrorResponse> {
    let id = payload.item_id()?;

    match state.repository.identifier_semantics() {
        IdentifierSemantics::Positional => {
            let count = state.repository.count().await?;
            let length = usize::try_from(count).unwrap_or(usize::MAX);
            if id.as_position(length).is_none() {
                tracing::warn!(%id, count, "Delete position out of bounds");
                return Err(ApiErrorResponse::bad_request(OUT_OF_BOUNDS));
            }
            state
                .repository
                .delete_by_id(id)
                .await
                .map_err(|error| positional_delete_error(id, error))?;
        }
        IdentifierSemantics::Durable => {
            state
                .repository
                .delete_by_id(id)
                .await
                .map_err(|error| {
                    if matches!(error, RepositoryError::NotFound(_)) {
                        tracing::warn!(%id, "Item not found");
                    }
                    ApiErrorResponse::from(error)
                })?;
        }
    }
    tracing::info!(%id, "Item deleted");

    Ok(mutation_response(payload.response_style()))
}

/// A position that vanished between the bounds check and the delete is
/// still a bad position, not a missing resource.
fn positional_delete_error(id: ItemId, error: RepositoryError) -> ApiErrorResponse {
    match error {
        RepositoryError::NotFound(_) => {
            tracing::warn!(%id, "Delete position out of bounds");
            ApiErrorResponse::bad_request(OUT_OF_BOUNDS)
        }
        other => ApiErrorResponse::from(other),
    }
}

fn mutation_response(style: ResponseStyle) -> Response {
    match style {
        ResponseStyle::Redirect => Redirect::to("/").into_response(),
        ResponseStyle::Silent => StatusCode::OK.into_response(),
    }
}

// =============================================================================
// Fallbacks
// =============================================================================

/// Answers a known path requested with an unsupported method.
pub async fn method_not_allowed() -> ApiErrorResponse {
    ApiErrorResponse::method_not_allowed()
}

/// Answers an unknown path.
pub async fn route_not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found("not found")
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
