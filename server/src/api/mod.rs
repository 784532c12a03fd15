pub mod recipes;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use std::convert::Infallible;
use utoipa::{OpenApi, ToSchema};

pub const NOT_FOUND_MESSAGE: &str = "Not Found";

/// Body shared by messages-only responses: deletes, 404s and server errors.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Returned with 400 when a field value cannot be coerced.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub detail: String,
}

pub fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new(message)),
    )
        .into_response()
}

/// Fallback for every path or method the router doesn't serve.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new(NOT_FOUND_MESSAGE)),
    )
        .into_response()
}

/// A request body read as a JSON object.
///
/// Anything that isn't a JSON object (empty body, malformed JSON, arrays,
/// scalars) becomes an empty map, regardless of content type. Handlers decide
/// what an empty map means.
#[derive(Debug, Clone, Default)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Bytes::from_request(req, state).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read request body: {}", e);
                return Ok(Self::default());
            }
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                if !body.is_empty() {
                    tracing::debug!("Ignoring malformed JSON body: {}", e);
                }
                Ok(Self::default())
            }
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Recipe API", description = "Create, list, update and delete recipes"),
        components(schemas(MessageResponse, ValidationErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();
    spec.merge(recipes::ApiDoc::openapi());
    spec
}
