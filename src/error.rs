use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::UserNotFound(_) => (StatusCode::NOT_FOUND, "User not found".to_string()),
            ServerError::Db(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
