use super::serialize_cost;
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

/// A recipe without timestamps, as returned by list and detail lookups.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub making_time: String,
    pub serves: String,
    pub ingredients: String,
    #[serde(serialize_with = "serialize_cost")]
    #[schema(value_type = String, example = "1000")]
    pub cost: i64,
}

impl From<RecipeSummaryRow> for RecipeSummary {
    fn from(r: RecipeSummaryRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            making_time: r.making_time,
            serves: r.serves,
            ingredients: r.ingredients,
            cost: r.cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
}

#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes in ascending id order", body = ListRecipesResponse),
        (status = 500, description = "Storage failure", body = crate::api::MessageResponse)
    )
)]
pub async fn list_recipes(State(pool): State<Arc<DbPool>>) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let results: Vec<RecipeSummaryRow> = match recipes::table
        .select(RecipeSummaryRow::as_select())
        .order(recipes::id.asc())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to list recipes: {}", e);
            return internal_error("Failed to fetch recipes");
        }
    };

    let recipes = results.into_iter().map(RecipeSummary::from).collect();

    (StatusCode::OK, Json(ListRecipesResponse { recipes })).into_response()
}
