//! API module for HTTP handlers.
//!
//! This module contains the route table, request decoding, response
//! rendering, and error formatting.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;

pub use dto::{FormFields, ItemResponse, Payload, ResponseStyle};
pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{
    AppState, HealthResponse, delete_item, health_check, index_page, save_item, view_items,
};
pub use render::{DEFAULT_TEMPLATE, HtmlTemplate, TemplateError};
pub use routes::router;
