//! Web UI Module
//!
//! The human-facing onboarding surface: landing page, guided setup
//! instructions, verification form, and disconnect control.

mod routes;
mod templates;

use axum::Router;
use std::sync::Arc;

use crate::api::AppState;

pub use routes::not_found;

/// Create the web UI router.
/// Mount this with `.merge(web_ui::router())` in main.rs
pub fn router() -> Router<Arc<AppState>> {
    routes::create_router()
}
