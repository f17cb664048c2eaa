//! Route table.
//!
//! | Route     | Methods      | Handler                          |
//! |-----------|--------------|----------------------------------|
//! | `/`       | GET          | [`index_page`]                   |
//! | `/view`   | GET          | [`view_items`]                   |
//! | `/save`   | POST         | [`save_item`]                    |
//! | `/delete` | POST, DELETE | [`delete_item`]                  |
//! | `/health` | GET          | [`health_check`]                 |
//!
//! Any other method on these paths answers `405`; unknown paths answer `404`.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, delete_item, health_check, index_page, method_not_allowed, route_not_found,
    save_item, view_items,
};

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page).fallback(method_not_allowed))
        .route("/view", get(view_items).fallback(method_not_allowed))
        .route("/save", post(save_item).fallback(method_not_allowed))
        .route(
            "/delete",
            post(delete_item)
                .delete(delete_item)
                .fallback(method_not_allowed),
        )
        .route("/health", get(health_check).fallback(method_not_allowed))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
