use anyhow::Context;
use recipe_server::config::Config;
use recipe_server::{api, db, telemetry, AppState};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    telemetry::init_telemetry()?;

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url)
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    db::initialize(&pool).context("failed to seed recipes table")?;

    let state: AppState = Arc::new(pool);
    let app = recipe_server::app(state);

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Using database {}", config.database_url);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
