mod api;
mod config;
mod db;
mod error;
mod notion;
mod onboarding;
mod web_ui;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use db::store::IntegrationStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notion_setup_assistant=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Resolve startup configuration once; nothing below reads the environment.
    let config = config::Config::from_env();

    // Initialize database. A failure here degrades the service to a disabled
    // store instead of aborting: the health endpoint reports "unhealthy" and
    // setup attempts fail with a user-facing message.
    let store = match db::init_database(&config.database_url).await {
        Ok(conn) => {
            tracing::info!("Database connection successful");
            IntegrationStore::Connected(conn)
        }
        Err(e) => {
            tracing::error!("Database connection failed on startup: {}", e);
            IntegrationStore::Disabled
        }
    };

    let state = Arc::new(AppState::new(store));

    let user_count = state.store.count().await;
    tracing::info!("{} connected integrations loaded", user_count);

    // Build router with explicit routes
    let app = Router::new()
        // Public API (consumed by the task-creation agent) + health
        .merge(api::api_router())
        // Human-facing onboarding UI
        .merge(web_ui::router())
        .fallback(web_ui::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Setup assistant starting on http://{}", config.bind_addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  GET    /api/user/:telegram_id - Fetch stored integration");
    tracing::info!("  DELETE /api/user/:telegram_id - Disconnect integration");
    tracing::info!("  GET    /health                - Liveness + user count");
    tracing::info!("Setup UI: http://{}/setup/<telegram_id>", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
