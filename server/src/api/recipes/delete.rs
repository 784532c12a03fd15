use super::RecipeId;
use crate::api::{internal_error, MessageResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use std::sync::Arc;

pub const REMOVED_MESSAGE: &str = "Recipe successfully removed!";
pub const NO_RECIPE_MESSAGE: &str = "No Recipe found";

#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe removed, or \"No Recipe found\"", body = MessageResponse),
        (status = 404, description = "Id is not a number", body = MessageResponse),
        (status = 500, description = "Storage failure", body = MessageResponse)
    )
)]
pub async fn delete_recipe(
    State(pool): State<Arc<DbPool>>,
    RecipeId(id): RecipeId,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // Hard delete. AUTOINCREMENT keeps the id from being handed out again.
    let deleted = match diesel::delete(recipes::table.find(id)).execute(&mut conn) {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to delete recipe {}: {}", id, e);
            return internal_error("Recipe deletion failed");
        }
    };

    if deleted == 0 {
        return (StatusCode::OK, Json(MessageResponse::new(NO_RECIPE_MESSAGE))).into_response();
    }

    tracing::info!(recipe_id = id, "recipe removed");

    (StatusCode::OK, Json(MessageResponse::new(REMOVED_MESSAGE))).into_response()
}
