use super::fields::{RecipeInput, REQUIRED_FIELDS};
use super::{invalid_field, serialize_cost, serialize_timestamp};
use crate::api::{internal_error, JsonObject, ValidationErrorResponse};
use crate::db::{self, DbPool};
use crate::get_conn;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const CREATED_MESSAGE: &str = "Recipe successfully created!";
pub const CREATION_FAILED_MESSAGE: &str = "Recipe creation failed!";

/// A freshly created recipe, timestamps included.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub making_time: String,
    pub serves: String,
    pub ingredients: String,
    #[serde(serialize_with = "serialize_cost")]
    #[schema(value_type = String, example = "1000")]
    pub cost: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    #[schema(value_type = String, example = "2016-01-10 12:10:12")]
    pub created_at: NaiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    #[schema(value_type = String, example = "2016-01-10 12:10:12")]
    pub updated_at: NaiveDateTime,
}

impl From<Recipe> for RecipeDetail {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            making_time: r.making_time,
            serves: r.serves,
            ingredients: r.ingredients,
            cost: r.cost,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeCreated {
    pub message: String,
    pub recipe: Vec<RecipeDetail>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeCreationFailed {
    pub message: String,
    pub required: String,
}

/// POST /recipes always answers 200; a missing field is reported in the body.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CreateRecipeResponse {
    Created(RecipeCreated),
    Failed(RecipeCreationFailed),
}

impl CreateRecipeResponse {
    fn created(recipe: Recipe) -> Self {
        Self::Created(RecipeCreated {
            message: CREATED_MESSAGE.to_string(),
            recipe: vec![recipe.into()],
        })
    }

    fn missing_fields() -> Self {
        Self::Failed(RecipeCreationFailed {
            message: CREATION_FAILED_MESSAGE.to_string(),
            required: REQUIRED_FIELDS.join(", "),
        })
    }
}

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body = RecipeInput,
    responses(
        (status = 200, description = "Recipe created, or the list of required fields when some are missing", body = CreateRecipeResponse),
        (status = 400, description = "A field value could not be coerced", body = ValidationErrorResponse),
        (status = 500, description = "Storage failure", body = crate::api::MessageResponse)
    )
)]
pub async fn create_recipe(
    State(pool): State<Arc<DbPool>>,
    JsonObject(body): JsonObject,
) -> impl IntoResponse {
    let input = match RecipeInput::from_body(&body) {
        Ok(Some(input)) => input,
        Ok(None) => {
            return (StatusCode::OK, Json(CreateRecipeResponse::missing_fields())).into_response()
        }
        Err(e) => return invalid_field(e),
    };

    let mut conn = get_conn!(pool);

    let now = db::now();
    let new_recipe = NewRecipe {
        title: &input.title,
        making_time: &input.making_time,
        serves: &input.serves,
        ingredients: &input.ingredients,
        cost: input.cost,
        created_at: now,
        updated_at: now,
    };

    let recipe: Recipe = match diesel::insert_into(recipes::table)
        .values(&new_recipe)
        .returning(Recipe::as_returning())
        .get_result(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return internal_error("Recipe creation failed");
        }
    };

    tracing::info!(recipe_id = recipe.id, "recipe created");

    (StatusCode::OK, Json(CreateRecipeResponse::created(recipe))).into_response()
}
