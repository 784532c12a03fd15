//! End-to-end tests for the /recipes endpoints.
//!
//! Each test gets its own SQLite file, migrated and seeded exactly as the
//! server does at startup.

use axum::http::{Method, StatusCode};
use axum_test::TestServer;
use diesel::prelude::*;
use recipe_server::db::{self, DbPool};
use recipe_server::models::Recipe;
use recipe_server::schema::recipes;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Keeps the temp directory alive for as long as the server is in use.
struct TestApp {
    server: TestServer,
    pool: Arc<DbPool>,
    _dir: TempDir,
}

impl TestApp {
    /// Reads a row straight from storage, timestamps included.
    fn stored(&self, id: i64) -> Option<Recipe> {
        let mut conn = self.pool.get().unwrap();
        recipes::table
            .find(id)
            .select(Recipe::as_select())
            .first(&mut conn)
            .optional()
            .unwrap()
    }
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("recipes.db");
    let pool = db::create_pool(path.to_str().unwrap()).expect("Failed to create pool");
    db::initialize(&pool).expect("Failed to seed database");

    let pool = Arc::new(pool);
    let server = TestServer::new(recipe_server::app(pool.clone())).unwrap();

    TestApp {
        server,
        pool,
        _dir: dir,
    }
}

fn pasta() -> Value {
    json!({
        "title": "Pasta",
        "making_time": "20分",
        "serves": "2人",
        "ingredients": "pasta,oil",
        "cost": 300
    })
}

async fn list_ids(server: &TestServer) -> Vec<i64> {
    let body: Value = server.get("/recipes").await.json();
    body["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_seed_recipes() {
    let app = test_app();

    let response = app.server.get("/recipes").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "recipes": [
            {
                "id": 1,
                "title": "チキンカレー",
                "making_time": "45分",
                "serves": "4人",
                "ingredients": "玉ねぎ,肉,スパイス",
                "cost": "1000"
            },
            {
                "id": 2,
                "title": "オムライス",
                "making_time": "30分",
                "serves": "2人",
                "ingredients": "玉ねぎ,卵,スパイス,醤油",
                "cost": "700"
            }
        ]
    }));
}

#[tokio::test]
async fn test_list_empty_store() {
    let app = test_app();
    app.server.delete("/recipes/1").await.assert_status_ok();
    app.server.delete("/recipes/2").await.assert_status_ok();

    let response = app.server.get("/recipes").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "recipes": [] }));
}

#[tokio::test]
async fn test_create_recipe() {
    let app = test_app();

    let response = app.server.post("/recipes").json(&pasta()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe successfully created!");

    let recipes = body["recipe"].as_array().unwrap();
    assert_eq!(recipes.len(), 1);

    let recipe = &recipes[0];
    assert_eq!(recipe["id"], 3);
    assert_eq!(recipe["title"], "Pasta");
    assert_eq!(recipe["making_time"], "20分");
    assert_eq!(recipe["serves"], "2人");
    assert_eq!(recipe["ingredients"], "pasta,oil");
    assert_eq!(recipe["cost"], "300");

    let created_at = recipe["created_at"].as_str().unwrap();
    assert_eq!(created_at.len(), "2016-01-10 12:10:12".len());
    assert_eq!(recipe["updated_at"], recipe["created_at"]);
}

#[tokio::test]
async fn test_create_assigns_increasing_ids() {
    let app = test_app();

    let mut previous = 2;
    for _ in 0..3 {
        let body: Value = app.server.post("/recipes").json(&pasta()).await.json();
        let id = body["recipe"][0]["id"].as_i64().unwrap();
        assert!(id > previous, "{id} should be greater than {previous}");
        previous = id;
    }
}

#[tokio::test]
async fn test_create_never_reuses_deleted_id() {
    let app = test_app();

    let body: Value = app.server.post("/recipes").json(&pasta()).await.json();
    assert_eq!(body["recipe"][0]["id"], 3);
    app.server.delete("/recipes/3").await.assert_status_ok();

    let body: Value = app.server.post("/recipes").json(&pasta()).await.json();
    assert_eq!(body["recipe"][0]["id"], 4);
}

#[tokio::test]
async fn test_create_accepts_numeric_string_cost() {
    let app = test_app();
    let mut payload = pasta();
    payload["cost"] = json!("450");

    let body: Value = app.server.post("/recipes").json(&payload).await.json();

    assert_eq!(body["recipe"][0]["cost"], "450");
}

#[tokio::test]
async fn test_create_missing_field() {
    let app = test_app();

    for field in ["title", "making_time", "serves", "ingredients", "cost"] {
        let mut payload = pasta();
        payload.as_object_mut().unwrap().remove(field);

        let response = app.server.post("/recipes").json(&payload).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "message": "Recipe creation failed!",
            "required": "title, making_time, serves, ingredients, cost"
        }));
    }

    assert_eq!(list_ids(&app.server).await, vec![1, 2]);
}

#[tokio::test]
async fn test_create_with_malformed_body() {
    let app = test_app();

    let response = app.server.post("/recipes").text("this is not json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe creation failed!");

    let response = app.server.post("/recipes").json(&json!(["title"])).await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe creation failed!");

    assert_eq!(list_ids(&app.server).await, vec![1, 2]);
}

#[tokio::test]
async fn test_create_rejects_non_numeric_cost() {
    let app = test_app();
    let mut payload = pasta();
    payload["cost"] = json!("cheap");

    let response = app.server.post("/recipes").json(&payload).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid value for cost");
    assert_eq!(list_ids(&app.server).await, vec![1, 2]);
}

#[tokio::test]
async fn test_create_rejects_fractional_cost() {
    let app = test_app();
    let mut payload = pasta();
    payload["cost"] = json!(12.5);

    let response = app.server.post("/recipes").json(&payload).await;

    response.assert_status_bad_request();
    assert_eq!(list_ids(&app.server).await, vec![1, 2]);
}

#[tokio::test]
async fn test_create_renders_non_string_text_fields() {
    let app = test_app();

    let response = app
        .server
        .post("/recipes")
        .json(&json!({
            "title": true,
            "making_time": null,
            "serves": 3.0,
            "ingredients": ["egg", "rice"],
            "cost": 300
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let recipe = &body["recipe"][0];
    assert_eq!(recipe["title"], "true");
    assert_eq!(recipe["making_time"], "null");
    assert_eq!(recipe["serves"], "3.0");
    assert_eq!(recipe["ingredients"], r#"["egg","rice"]"#);

    let stored = app.stored(recipe["id"].as_i64().unwrap()).unwrap();
    assert_eq!(stored.title, "true");
    assert_eq!(stored.making_time, "null");
}

#[tokio::test]
async fn test_get_recipe() {
    let app = test_app();

    let response = app.server.get("/recipes/1").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe details by id",
        "recipe": [{
            "id": 1,
            "title": "チキンカレー",
            "making_time": "45分",
            "serves": "4人",
            "ingredients": "玉ねぎ,肉,スパイス",
            "cost": "1000"
        }]
    }));
}

#[tokio::test]
async fn test_get_unknown_recipe() {
    let app = test_app();

    let response = app.server.get("/recipes/999").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe details by id",
        "recipe": []
    }));
}

#[tokio::test]
async fn test_created_recipe_is_listed_and_fetchable() {
    let app = test_app();

    let created: Value = app.server.post("/recipes").json(&pasta()).await.json();
    let created = &created["recipe"][0];
    let id = created["id"].as_i64().unwrap();

    let fetched: Value = app.server.get(&format!("/recipes/{id}")).await.json();
    let fetched = fetched["recipe"].as_array().unwrap();
    assert_eq!(fetched.len(), 1);
    for field in ["id", "title", "making_time", "serves", "ingredients", "cost"] {
        assert_eq!(fetched[0][field], created[field], "field {field}");
    }
    assert!(fetched[0].get("created_at").is_none());

    let ids = list_ids(&app.server).await;
    assert_eq!(ids.iter().filter(|&&i| i == id).count(), 1);
}

#[tokio::test]
async fn test_patch_cost_only() {
    let app = test_app();
    app.server.post("/recipes").json(&pasta()).await.assert_status_ok();
    let before: Value = app.server.get("/recipes/3").await.json();

    let response = app
        .server
        .patch("/recipes/3")
        .json(&json!({ "cost": 350 }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe successfully updated!",
        "recipe": [{ "cost": "350" }]
    }));

    let after: Value = app.server.get("/recipes/3").await.json();
    assert_eq!(after["recipe"][0]["cost"], "350");
    for field in ["title", "making_time", "serves", "ingredients"] {
        assert_eq!(after["recipe"][0][field], before["recipe"][0][field]);
    }
}

#[tokio::test]
async fn test_patch_keeps_created_at_and_refreshes_updated_at() {
    let app = test_app();
    let before = app.stored(1).unwrap();

    app.server
        .patch("/recipes/1")
        .json(&json!({ "cost": 500 }))
        .await
        .assert_status_ok();

    let after = app.stored(1).unwrap();
    assert_eq!(after.cost, 500);
    assert_eq!(after.title, before.title);
    assert_eq!(after.making_time, before.making_time);
    assert_eq!(after.serves, before.serves);
    assert_eq!(after.ingredients, before.ingredients);
    assert_eq!(after.created_at, before.created_at);
    // Seed rows carry 2016 timestamps, so any refresh is observable.
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_patch_multiple_fields_echoes_text() {
    let app = test_app();

    let response = app
        .server
        .patch("/recipes/2")
        .json(&json!({ "title": "トマトオムライス", "serves": 3, "unknown": "x" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe successfully updated!",
        "recipe": [{ "title": "トマトオムライス", "serves": "3" }]
    }));

    let body: Value = app.server.get("/recipes/2").await.json();
    assert_eq!(body["recipe"][0]["title"], "トマトオムライス");
    assert_eq!(body["recipe"][0]["serves"], "3");
    assert_eq!(body["recipe"][0]["cost"], "700");
}

#[tokio::test]
async fn test_patch_empty_body() {
    let app = test_app();

    let response = app.server.patch("/recipes/1").json(&json!({})).await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe successfully updated!",
        "recipe": [{}]
    }));
}

#[tokio::test]
async fn test_patch_unknown_recipe() {
    let app = test_app();

    let response = app
        .server
        .patch("/recipes/42")
        .json(&json!({ "cost": 500 }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe successfully updated!",
        "recipe": [{}]
    }));
    assert_eq!(list_ids(&app.server).await, vec![1, 2]);
    assert!(app.stored(42).is_none());
}

#[tokio::test]
async fn test_patch_rejects_non_numeric_cost() {
    let app = test_app();

    let response = app
        .server
        .patch("/recipes/1")
        .json(&json!({ "title": "Changed", "cost": "a lot" }))
        .await;

    response.assert_status_bad_request();

    let body: Value = app.server.get("/recipes/1").await.json();
    assert_eq!(body["recipe"][0]["title"], "チキンカレー");
    assert_eq!(body["recipe"][0]["cost"], "1000");

    let stored = app.stored(1).unwrap();
    assert_eq!(stored.updated_at, stored.created_at);
}

#[tokio::test]
async fn test_delete_recipe() {
    let app = test_app();

    let response = app.server.delete("/recipes/1").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "message": "Recipe successfully removed!" }));

    let response = app.server.get("/recipes/1").await;
    response.assert_json(&json!({
        "message": "Recipe details by id",
        "recipe": []
    }));

    let response = app.server.delete("/recipes/1").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "message": "No Recipe found" }));

    assert_eq!(list_ids(&app.server).await, vec![2]);
}

#[tokio::test]
async fn test_ids_beyond_32_bits_use_not_found_shapes() {
    let app = test_app();

    let response = app.server.get("/recipes/2147483648").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe details by id",
        "recipe": []
    }));

    let response = app
        .server
        .patch("/recipes/2147483648")
        .json(&json!({ "cost": 500 }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Recipe successfully updated!",
        "recipe": [{}]
    }));

    let response = app.server.delete("/recipes/2147483648").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "message": "No Recipe found" }));

    let response = app.server.get("/recipes/9223372036854775808").await;
    response.assert_status_not_found();
    response.assert_json(&json!({ "message": "Not Found" }));
}

#[tokio::test]
async fn test_recipe_with_id_beyond_32_bits() {
    let app = test_app();
    let big_id: i64 = 2_147_483_648;
    {
        let mut conn = app.pool.get().unwrap();
        let created_at = db::now();
        diesel::insert_into(recipes::table)
            .values((
                recipes::id.eq(big_id),
                recipes::title.eq("Pasta"),
                recipes::making_time.eq("20分"),
                recipes::serves.eq("2人"),
                recipes::ingredients.eq("pasta,oil"),
                recipes::cost.eq(300_i64),
                recipes::created_at.eq(created_at),
                recipes::updated_at.eq(created_at),
            ))
            .execute(&mut conn)
            .unwrap();
    }

    let body: Value = app.server.get("/recipes/2147483648").await.json();
    assert_eq!(body["recipe"][0]["id"], big_id);
    assert_eq!(body["recipe"][0]["title"], "Pasta");

    // AUTOINCREMENT continues past the largest id ever stored.
    let created: Value = app.server.post("/recipes").json(&pasta()).await.json();
    assert_eq!(created["recipe"][0]["id"], big_id + 1);

    app.server
        .patch("/recipes/2147483648")
        .json(&json!({ "cost": 350 }))
        .await
        .assert_json(&json!({
            "message": "Recipe successfully updated!",
            "recipe": [{ "cost": "350" }]
        }));
    assert_eq!(app.stored(big_id).unwrap().cost, 350);

    app.server
        .delete("/recipes/2147483648")
        .await
        .assert_json(&json!({ "message": "Recipe successfully removed!" }));
    assert!(app.stored(big_id).is_none());
}

#[tokio::test]
async fn test_full_lifecycle() {
    let app = test_app();

    let created: Value = app.server.post("/recipes").json(&pasta()).await.json();
    assert_eq!(created["recipe"][0]["id"], 3);
    assert_eq!(created["recipe"][0]["cost"], "300");

    app.server
        .patch("/recipes/3")
        .json(&json!({ "cost": 350 }))
        .await
        .assert_json(&json!({
            "message": "Recipe successfully updated!",
            "recipe": [{ "cost": "350" }]
        }));

    app.server
        .delete("/recipes/3")
        .await
        .assert_json(&json!({ "message": "Recipe successfully removed!" }));

    app.server.get("/recipes/3").await.assert_json(&json!({
        "message": "Recipe details by id",
        "recipe": []
    }));
}

#[tokio::test]
async fn test_unknown_path() {
    let app = test_app();

    let response = app.server.get("/nope").await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "message": "Not Found" }));
}

#[tokio::test]
async fn test_unsupported_method() {
    let app = test_app();

    let response = app.server.method(Method::PUT, "/recipes").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "message": "Not Found" }));

    let response = app.server.post("/recipes/1").json(&pasta()).await;
    response.assert_status_not_found();
    response.assert_json(&json!({ "message": "Not Found" }));
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let app = test_app();

    for path in ["/recipes/abc", "/recipes/-1", "/recipes/1.5"] {
        let response = app.server.get(path).await;
        response.assert_status_not_found();
        response.assert_json(&json!({ "message": "Not Found" }));
    }

    let response = app.server.delete("/recipes/abc").await;
    response.assert_status_not_found();
    assert_eq!(list_ids(&app.server).await, vec![1, 2]);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = test_app();

    let response = app.server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let spec: Value = response.json();
    assert!(spec["paths"]["/recipes"]["post"].is_object());
    assert!(spec["paths"]["/recipes/{id}"]["patch"].is_object());
}
