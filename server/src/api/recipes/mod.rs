pub mod create;
pub mod delete;
pub mod fields;
pub mod get;
pub mod list;
pub mod update;

use crate::api::{not_found, ValidationErrorResponse};
use crate::db::TIMESTAMP_FORMAT;
use crate::AppState;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use fields::FieldError;
use serde::Serializer;
use utoipa::OpenApi;

/// Returns the router for /recipes endpoints (mounted at /recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list::list_recipes)
                .post(create::create_recipe)
                .fallback(not_found),
        )
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe)
                .fallback(not_found),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        fields::RecipeInput,
        fields::RecipePatch,
        create::RecipeDetail,
        create::CreateRecipeResponse,
        create::RecipeCreated,
        create::RecipeCreationFailed,
        list::RecipeSummary,
        list::ListRecipesResponse,
        get::RecipeDetailsResponse,
        update::UpdateRecipeResponse,
    ))
)]
pub struct ApiDoc;

/// Path id of a recipe route.
///
/// Only plain decimal digits are accepted; anything else is answered like an
/// unknown route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeId(pub i64);

impl<S> FromRequestParts<S> for RecipeId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(Path(raw)) = Path::<String>::from_request_parts(parts, state).await else {
            return Err(not_found().await);
        };

        match parse_recipe_id(&raw) {
            Some(id) => Ok(RecipeId(id)),
            None => Err(not_found().await),
        }
    }
}

fn parse_recipe_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

pub(crate) fn invalid_field(error: FieldError) -> Response {
    tracing::debug!("Rejecting recipe payload: {}", error);
    (
        StatusCode::BAD_REQUEST,
        Json(ValidationErrorResponse {
            message: format!("Invalid value for {}", error.field()),
            detail: error.to_string(),
        }),
    )
        .into_response()
}

// Costs are stored as integers but always leave the API as decimal strings.
pub(crate) fn serialize_cost<S: Serializer>(cost: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(cost)
}

pub(crate) fn serialize_optional_cost<S: Serializer>(
    cost: &Option<i64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match cost {
        Some(cost) => serialize_cost(cost, serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}
