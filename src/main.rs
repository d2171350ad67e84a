use std::sync::Arc;

use axum::{Json, Router, extract::DefaultBodyLimit, routing::get};
use kinchat::{
    AppState, api, collab::Clients, config::Config, history::HistoryStore,
    registry::ConnectionRegistry, relay,
};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kinchat=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await?;
    let history = HistoryStore::new(db_pool);
    history.ensure_schema().await?;

    let app_state = AppState {
        collab: Clients::new(&config),
        registry: Arc::new(ConnectionRegistry::new()),
        history,
        config: config.clone(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .merge(relay::router())
        .nest("/api", api::router())
        .layer(DefaultBodyLimit::max(config.max_image_bytes + 1024))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}
