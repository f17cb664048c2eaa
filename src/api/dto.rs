//! Data Transfer Objects for API requests and responses.
//!
//! Requests arrive either as URL-encoded forms (the HTML page) or as JSON
//! bodies (scripted clients). [`Payload`] decodes both into one shape; the
//! field accessors below enforce the presence rules for each operation.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ApiErrorResponse;
use crate::domain::{Description, Item, ItemId};

/// Status message for a save without a usable description.
pub const MISSING_DESCRIPTION: &str = "missing description parameter";
/// Status message for a delete without an id.
pub const MISSING_ID: &str = "missing id parameter";

// =============================================================================
// Response DTOs
// =============================================================================

/// Response DTO for one item in the JSON listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResponse {
    /// Resolved id.
    #[serde(rename = "ID")]
    pub id: i64,
    /// Item text.
    #[serde(rename = "Description")]
    pub description: String,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.value(),
            description: item.description.as_str().to_string(),
        }
    }
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.value(),
            description: item.description.into_inner(),
        }
    }
}

// =============================================================================
// Form Fields
// =============================================================================

/// Decoded URL-encoded fields, in arrival order, keys possibly repeated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    /// Creates form fields from decoded pairs.
    #[must_use]
    pub const fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn distinct_keys(&self) -> usize {
        let mut keys: Vec<&str> = self.0.iter().map(|(name, _)| name.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

// =============================================================================
// Payload
// =============================================================================

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// URL-encoded form fields; body fields first, then query-string fields.
    Form(FormFields),
    /// A JSON object.
    Json(Map<String, Value>),
}

/// How a successful mutation is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    /// `303 See Other` back to the page.
    Redirect,
    /// `200 OK` with an empty body.
    Silent,
}

impl Payload {
    /// Decodes a body according to its content type.
    ///
    /// A body is JSON when `content_type` is `application/json`, or when no
    /// content type is given and the body starts with `{`. Anything else is
    /// decoded as a URL-encoded form, followed by the `query` fields.
    ///
    /// # Errors
    ///
    /// Returns a 400 response if the body cannot be decoded.
    pub fn decode(
        content_type: Option<&str>,
        query: Option<&str>,
        body: &[u8],
    ) -> Result<Self, ApiErrorResponse> {
        if is_json(content_type, body) {
            return match serde_json::from_slice::<Value>(body) {
                Ok(Value::Object(object)) => Ok(Self::Json(object)),
                Ok(_) => Err(ApiErrorResponse::bad_request(
                    "can't parse body: expected a JSON object",
                )),
                Err(error) => Err(ApiErrorResponse::bad_request(format!(
                    "can't parse body: {error}"
                ))),
            };
        }

        let mut pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|error| ApiErrorResponse::bad_request(format!("can't parse body: {error}")))?;
        if let Some(query) = query {
            let query_pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
                .map_err(|error| {
                    ApiErrorResponse::bad_request(format!("can't parse query: {error}"))
                })?;
            pairs.extend(query_pairs);
        }
        Ok(Self::Form(FormFields::new(pairs)))
    }

    /// Returns how a successful mutation from this payload is answered.
    #[must_use]
    pub const fn response_style(&self) -> ResponseStyle {
        match self {
            Self::Form(_) => ResponseStyle::Redirect,
            Self::Json(_) => ResponseStyle::Silent,
        }
    }

    /// Extracts the description for a save.
    ///
    /// # Errors
    ///
    /// Returns a 400 response if the description is absent, empty, or not a
    /// JSON string.
    pub fn description(&self) -> Result<Description, ApiErrorResponse> {
        let raw = match self {
            Self::Form(fields) => fields.first("description"),
            Self::Json(object) => json_field(object, "description").and_then(Value::as_str),
        };
        raw.ok_or_else(|| ApiErrorResponse::bad_request(MISSING_DESCRIPTION))
            .and_then(|value| {
                Description::parse(value)
                    .map_err(|_| ApiErrorResponse::bad_request(MISSING_DESCRIPTION))
            })
    }

    /// Extracts the id for a delete.
    ///
    /// Forms must carry a single field, `id`, holding a decimal integer;
    /// JSON must carry an integer `id`.
    ///
    /// # Errors
    ///
    /// Returns a 400 response if the form has extra fields, or the id is
    /// absent or not an integer.
    pub fn item_id(&self) -> Result<ItemId, ApiErrorResponse> {
        match self {
            Self::Form(fields) => {
                if fields.distinct_keys() > 1 {
                    return Err(ApiErrorResponse::bad_request("too many form fields"));
                }
                let raw = fields
                    .first("id")
                    .ok_or_else(|| ApiErrorResponse::bad_request(MISSING_ID))?;
                raw.trim().parse::<i64>().map(ItemId::new).map_err(|error| {
                    ApiErrorResponse::bad_request(format!(
                        "can't convert id to integer: {error}"
                    ))
                })
            }
            Self::Json(object) => {
                let value = json_field(object, "id")
                    .ok_or_else(|| ApiErrorResponse::bad_request(MISSING_ID))?;
                value.as_i64().map(ItemId::new).ok_or_else(|| {
                    ApiErrorResponse::bad_request(format!(
                        "can't convert id to integer: {value}"
                    ))
                })
            }
        }
    }
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let query = request.uri().query().map(str::to_owned);

        let body = Bytes::from_request(request, state)
            .await
            .map_err(|error| ApiErrorResponse::bad_request(format!("can't read body: {error}")))?;

        Self::decode(content_type.as_deref(), query.as_deref(), &body)
    }
}

fn is_json(content_type: Option<&str>, body: &[u8]) -> bool {
    match content_type {
        Some(value) => value
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json")),
        None => body
            .iter()
            .find(|byte| !byte.is_ascii_whitespace())
            .is_some_and(|byte| *byte == b'{'),
    }
}

/// Looks up a key case-insensitively, preferring an exact match.
fn json_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

// =============================================================================
// Tests
// =============================================================================
