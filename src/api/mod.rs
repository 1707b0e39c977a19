pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;

pub use handlers::{delete_user, get_user, health, AppState};

/// Create the public API router, consumed by the downstream task-creation
/// agent, plus the health endpoint.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/:telegram_id", get(get_user).delete(delete_user))
        .route("/health", get(health))
}
