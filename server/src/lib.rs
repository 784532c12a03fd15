pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod schema;
pub mod telemetry;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
pub type AppState = Arc<db::DbPool>;

/// Builds the full application: recipe routes, API docs, the JSON 404
/// fallback and request tracing.
pub fn app(pool: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .nest("/recipes", api::recipes::router())
        .merge(swagger_ui)
        .fallback(api::not_found)
        .with_state(pool)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(telemetry::make_request_span)
                .on_request(())
                .on_response(telemetry::log_response)
                .on_failure(telemetry::log_failure),
        )
}
