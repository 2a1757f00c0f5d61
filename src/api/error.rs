//! HTTP error responses.
//!
//! Propagated gateway failures surface to callers as a generic server
//! error carrying the upstream error text; degraded operations never reach
//! this type.

use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use serde::Serialize;

use crate::providers::outreach::ProviderError;

/// Errors surfaced by the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// A gateway operation failed and its policy is to propagate.
    Upstream(ProviderError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let ApiError::Upstream(source) = self;
        tracing::error!(error = %source, "request failed");

        let error_response = ErrorResponse {
            error: "UpstreamError".to_string(),
            message: source.to_string(),
        };

        let json = serde_json::to_string(&error_response).unwrap_or_else(|_| {
            r#"{"error":"SerializationError","message":"failed to serialize error"}"#.to_string()
        });

        Response::build()
            .status(Status::InternalServerError)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Upstream(err)
    }
}
