use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::db::store::IntegrationStore;
use crate::error::{Result, ServerError};

/// Application state shared across handlers
pub struct AppState {
    pub store: IntegrationStore,
    /// Shared connection pool for outbound Notion calls; per-request clients
    /// clone this and carry their own bearer token.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(store: IntegrationStore) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
        }
    }
}

/// Format a stored unix-millis timestamp as RFC 3339 for API consumers.
pub fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}

/// GET /api/user/:telegram_id - Full integration record, or 404
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<Value>> {
    let record = state.store.get(telegram_id).await.map_err(|e| {
        tracing::error!(telegram_id, "Failed to load user data: {}", e);
        e
    })?;

    let Some(user) = record else {
        return Err(ServerError::UserNotFound(telegram_id));
    };

    Ok(Json(json!({
        "telegram_id": user.telegram_id,
        "access_token": user.access_token,
        "workspace_id": user.workspace_id,
        "workspace_name": user.workspace_name,
        "bot_id": user.bot_id,
        "database_id": user.database_id,
        "user_name": user.user_name,
        "connected_at": format_timestamp(user.created_at),
        "updated_at": format_timestamp(user.updated_at),
    })))
}

/// DELETE /api/user/:telegram_id - Agent-initiated disconnect
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<Value>> {
    let removed = state.store.delete(telegram_id).await.map_err(|e| {
        tracing::error!(telegram_id, "Failed to disconnect user: {}", e);
        e
    })?;

    if !removed {
        return Err(ServerError::UserNotFound(telegram_id));
    }

    tracing::info!(telegram_id, "Integration disconnected via API");
    Ok(Json(json!({
        "success": true,
        "message": "User disconnected successfully",
    })))
}

/// GET /health - Liveness probe plus user count
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_ok = state.store.liveness_probe().await;

    Json(json!({
        "status": if db_ok { "healthy" } else { "unhealthy" },
        "database": if db_ok { "connected" } else { "disconnected" },
        "users": state.store.count().await,
        "service": "notion-setup-assistant",
    }))
}
