//! Room service endpoints.
//!
//! The service side of persistence: requests are routed by method and path,
//! bodies are JSON and every response carries a status code. [`RoomApi`]
//! owns the room database and answers
//!
//! - `POST /rooms` (save, full replace)
//! - `GET /rooms/{id}` (load)
//! - `DELETE /rooms/{id}` (delete, cascading)
//!
//! The id may also be passed as `?id=` on `/rooms`.

mod rooms;
pub mod slug;

pub use rooms::RoomApi;

use serde::Serialize;

use crate::payload::{ErrorBody, SavePayload};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
pub const STATUS_SERVER_ERROR: u16 = 500;

/// A routed request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Save(SavePayload),
    Load(String),
    Delete(String),
}

impl ApiRequest {
    /// Route a raw request. Malformed requests come back as the response
    /// to send.
    pub fn parse(method: &str, path: &str, body: &str) -> Result<Self, ApiResponse> {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let rest = path
            .trim_end_matches('/')
            .strip_prefix("/rooms")
            .ok_or_else(|| ApiResponse::error(STATUS_NOT_FOUND, "Not found"))?;

        let id = match rest.strip_prefix('/') {
            Some(id) if !id.contains('/') => Some(id.to_string()),
            Some(_) => return Err(ApiResponse::error(STATUS_NOT_FOUND, "Not found")),
            None if rest.is_empty() => query.and_then(query_id),
            None => return Err(ApiResponse::error(STATUS_NOT_FOUND, "Not found")),
        };

        match method.to_ascii_uppercase().as_str() {
            "POST" => serde_json::from_str(body)
                .map(ApiRequest::Save)
                .map_err(|e| {
                    ApiResponse::error_with_details(
                        STATUS_BAD_REQUEST,
                        "Invalid request body",
                        e.to_string(),
                    )
                }),
            "GET" => id
                .map(ApiRequest::Load)
                .ok_or_else(|| ApiResponse::error(STATUS_BAD_REQUEST, "Room ID required")),
            "DELETE" => id
                .map(ApiRequest::Delete)
                .ok_or_else(|| ApiResponse::error(STATUS_BAD_REQUEST, "Room ID required")),
            _ => Err(ApiResponse::error(
                STATUS_METHOD_NOT_ALLOWED,
                "Method not allowed",
            )),
        }
    }
}

fn query_id(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "id")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// A status code and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error_with_details(
                STATUS_SERVER_ERROR,
                "Failed to encode response",
                e.to_string(),
            ),
        }
    }

    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(STATUS_OK, body)
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(
            status,
            &ErrorBody {
                error: message.into(),
                details: None,
            },
        )
    }

    pub fn error_with_details(
        status: u16,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::json(
            status,
            &ErrorBody {
                error: message.into(),
                details: Some(details.into()),
            },
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The error payload of a failed response.
    pub fn error_body(&self) -> Option<ErrorBody> {
        if self.is_success() {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }
}
