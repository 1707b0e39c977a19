//! Route handlers for the onboarding UI.
//!
//! Failures redirect back to the setup page with the reason in an `error`
//! query parameter (flash-message equivalent); success renders the
//! confirmation page directly.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tera::Context;

use super::templates;
use crate::api::AppState;
use crate::notion::NotionClient;
use crate::onboarding::{self, SetupSubmission};

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/setup/:telegram_id", get(setup_page))
        .route("/verify/:telegram_id", post(verify_setup))
        .route("/disconnect/:telegram_id", post(disconnect))
}

/// Helper to render a template
fn render_template(name: &str, context: &Context) -> Response {
    match templates::render(name, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response()
        }
    }
}

/// Redirect back to the setup page carrying a flash message. The message may
/// quote upstream error bodies, so it is fully form-encoded; anything else
/// would be an invalid Location header.
fn redirect_to_setup(telegram_id: i64, param: &str, message: &str) -> Response {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("/setup/{}?{}={}", telegram_id, param, encoded)).into_response()
}

/// Show only the start of a stored token.
fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{}…", prefix)
}

fn format_date(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// GET / - Landing page with the connected-integration count
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let mut context = Context::new();
    context.insert("user_count", &state.store.count().await);
    render_template("index.html", &context)
}

/// GET /setup/:telegram_id - Instructions page, with the existing record's
/// summary and a disconnect control when the user is already configured
pub async fn setup_page(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut context = Context::new();
    context.insert("telegram_id", &telegram_id);
    if let Some(error) = query.get("error") {
        context.insert("error", error);
    }
    if let Some(message) = query.get("message") {
        context.insert("message", message);
    }

    match state.store.get(telegram_id).await {
        Ok(Some(existing)) => {
            context.insert("existing_workspace", &existing.workspace_name);
            context.insert("existing_connected_at", &format_date(existing.created_at));
            context.insert("existing_token", &mask_token(&existing.access_token));
        }
        Ok(None) => {}
        Err(e) => {
            // Shown as unconfigured; the form itself will surface store errors.
            tracing::error!(telegram_id, "Failed to load integration: {}", e);
        }
    }

    render_template("setup.html", &context)
}

/// Setup form fields
#[derive(serde::Deserialize)]
pub struct VerifyForm {
    pub token: String,
    pub database_id: String,
    pub user_name: Option<String>,
}

/// POST /verify/:telegram_id - Run the verification sequence
pub async fn verify_setup(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
    Form(form): Form<VerifyForm>,
) -> Response {
    let token = form.token.trim().to_string();
    let database_id = form.database_id.trim().to_string();
    let user_name = form
        .user_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from);

    let client = NotionClient::new(state.http.clone(), token.clone());
    let submission = SetupSubmission {
        token,
        database_id,
        user_name,
    };

    match onboarding::run_verification(&client, &state.store, telegram_id, submission).await {
        Ok(setup) => {
            let mut context = Context::new();
            context.insert("user_name", &setup.user_name);
            context.insert("workspace_name", &setup.workspace_name);
            context.insert("database_title", &setup.database_title);
            render_template("success.html", &context)
        }
        Err(rejection) => redirect_to_setup(telegram_id, "error", &rejection.to_string()),
    }
}

/// POST /disconnect/:telegram_id - User-initiated disconnect
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
) -> Response {
    match state.store.delete(telegram_id).await {
        Ok(true) => {
            tracing::info!(telegram_id, "Integration disconnected via setup page");
            redirect_to_setup(
                telegram_id,
                "message",
                "Integration disconnected successfully",
            )
        }
        Ok(false) => redirect_to_setup(telegram_id, "error", "User not found or already disconnected"),
        Err(e) => {
            tracing::error!(telegram_id, "Failed to disconnect user: {}", e);
            redirect_to_setup(telegram_id, "error", "Failed to disconnect integration")
        }
    }
}

/// Fallback for unknown paths
pub async fn not_found() -> Response {
    let mut context = Context::new();
    context.insert("message", "The page you're looking for doesn't exist.");
    match templates::render("error.html", &context) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
