//! Validation and coercion of recipe fields taken from request bodies.
//!
//! Text fields accept any JSON value: strings are kept verbatim and every
//! other value is stored as its compact JSON text. `cost` must describe a
//! whole number that fits in an `i64`; fractional or non-numeric values are
//! rejected rather than truncated.

use super::serialize_optional_cost;
use crate::models::RecipeChanges;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::num::IntErrorKind;
use thiserror::Error;
use utoipa::ToSchema;

pub const REQUIRED_FIELDS: [&str; 5] = ["title", "making_time", "serves", "ingredients", "cost"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("cost must be an integer, got {0}")]
    CostNotAnInteger(String),

    #[error("cost {0} does not fit in a 64-bit integer")]
    CostOutOfRange(String),
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::CostNotAnInteger(_) | FieldError::CostOutOfRange(_) => "cost",
        }
    }
}

pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn coerce_cost(value: &Value) -> Result<i64, FieldError> {
    match value {
        Value::Number(n) => number_to_cost(n),
        Value::String(s) => s.trim().parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                FieldError::CostOutOfRange(value.to_string())
            }
            _ => FieldError::CostNotAnInteger(value.to_string()),
        }),
        other => Err(FieldError::CostNotAnInteger(other.to_string())),
    }
}

fn number_to_cost(n: &Number) -> Result<i64, FieldError> {
    if let Some(cost) = n.as_i64() {
        return Ok(cost);
    }
    if n.is_u64() {
        return Err(FieldError::CostOutOfRange(n.to_string()));
    }

    // Floats are only accepted when they carry no fractional part.
    match n.as_f64() {
        Some(f) if f.fract() != 0.0 => Err(FieldError::CostNotAnInteger(n.to_string())),
        Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        Some(_) => Err(FieldError::CostOutOfRange(n.to_string())),
        None => Err(FieldError::CostNotAnInteger(n.to_string())),
    }
}

/// A complete, coerced set of fields for a new recipe.
#[derive(Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RecipeInput {
    pub title: String,
    pub making_time: String,
    pub serves: String,
    pub ingredients: String,
    pub cost: i64,
}

impl RecipeInput {
    /// `Ok(None)` when any required field is missing from the body.
    pub fn from_body(body: &Map<String, Value>) -> Result<Option<Self>, FieldError> {
        let (Some(title), Some(making_time), Some(serves), Some(ingredients), Some(cost)) = (
            body.get("title"),
            body.get("making_time"),
            body.get("serves"),
            body.get("ingredients"),
            body.get("cost"),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            title: coerce_text(title),
            making_time: coerce_text(making_time),
            serves: coerce_text(serves),
            ingredients: coerce_text(ingredients),
            cost: coerce_cost(cost)?,
        }))
    }
}

/// The supplied subset of fields for a partial update.
///
/// Serializes to exactly the fields that were supplied, each as a string,
/// which is the shape echoed back by PATCH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub making_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serves: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_cost"
    )]
    #[schema(value_type = Option<String>, example = "350")]
    pub cost: Option<i64>,
}

impl RecipePatch {
    /// Unknown keys are ignored.
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, FieldError> {
        Ok(Self {
            title: body.get("title").map(coerce_text),
            making_time: body.get("making_time").map(coerce_text),
            serves: body.get("serves").map(coerce_text),
            ingredients: body.get("ingredients").map(coerce_text),
            cost: body.get("cost").map(coerce_cost).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn to_changes(&self, updated_at: NaiveDateTime) -> RecipeChanges {
        RecipeChanges {
            title: self.title.clone(),
            making_time: self.making_time.clone(),
            serves: self.serves.clone(),
            ingredients: self.ingredients.clone(),
            cost: self.cost,
            updated_at: Some(updated_at),
        }
    }
}
