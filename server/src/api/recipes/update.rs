use super::fields::RecipePatch;
use super::{invalid_field, RecipeId};
use crate::api::{internal_error, JsonObject, ValidationErrorResponse};
use crate::db::{self, DbPool};
use crate::get_conn;
use crate::schema::recipes;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const UPDATED_MESSAGE: &str = "Recipe successfully updated!";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateRecipeResponse {
    pub message: String,
    /// The supplied fields as text, or a single empty object when nothing changed.
    pub recipe: Vec<RecipePatch>,
}

fn updated(patch: RecipePatch) -> Response {
    (
        StatusCode::OK,
        Json(UpdateRecipeResponse {
            message: UPDATED_MESSAGE.to_string(),
            recipe: vec![patch],
        }),
    )
        .into_response()
}

// Unknown ids and empty bodies both answer with the success message and an
// empty object; clients of this API never see a 404 from PATCH.
#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = RecipePatch,
    responses(
        (status = 200, description = "Fields that were updated", body = UpdateRecipeResponse),
        (status = 400, description = "A field value could not be coerced", body = ValidationErrorResponse),
        (status = 404, description = "Id is not a number", body = crate::api::MessageResponse),
        (status = 500, description = "Storage failure", body = crate::api::MessageResponse)
    )
)]
pub async fn update_recipe(
    State(pool): State<Arc<DbPool>>,
    RecipeId(id): RecipeId,
    JsonObject(body): JsonObject,
) -> impl IntoResponse {
    let patch = match RecipePatch::from_body(&body) {
        Ok(p) => p,
        Err(e) => return invalid_field(e),
    };

    if patch.is_empty() {
        return updated(RecipePatch::default());
    }

    let mut conn = get_conn!(pool);

    let count = match diesel::update(recipes::table.find(id))
        .set(&patch.to_changes(db::now()))
        .execute(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to update recipe {}: {}", id, e);
            return internal_error("Recipe update failed");
        }
    };

    if count == 0 {
        tracing::debug!(recipe_id = id, "update ignored, recipe not found");
        return updated(RecipePatch::default());
    }

    tracing::info!(recipe_id = id, "recipe updated");

    updated(patch)
}
