use super::list::RecipeSummary;
use super::RecipeId;
use crate::api::internal_error;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::RecipeSummaryRow;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const DETAILS_MESSAGE: &str = "Recipe details by id";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetailsResponse {
    pub message: String,
    /// Holds the recipe, or nothing when the id is unknown.
    pub recipe: Vec<RecipeSummary>,
}

#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details; empty list when not found", body = RecipeDetailsResponse),
        (status = 404, description = "Id is not a number", body = crate::api::MessageResponse),
        (status = 500, description = "Storage failure", body = crate::api::MessageResponse)
    )
)]
pub async fn get_recipe(
    State(pool): State<Arc<DbPool>>,
    RecipeId(id): RecipeId,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let recipe: Option<RecipeSummaryRow> = match recipes::table
        .find(id)
        .select(RecipeSummaryRow::as_select())
        .first(&mut conn)
        .optional()
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipe {}: {}", id, e);
            return internal_error("Failed to fetch recipe");
        }
    };

    let response = RecipeDetailsResponse {
        message: DETAILS_MESSAGE.to_string(),
        recipe: recipe.into_iter().map(RecipeSummary::from).collect(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
