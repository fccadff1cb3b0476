use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

pub const NO_NETWORK_MESSAGE: &str = "No network connection";

const NETWORK_MARKERS: [&str; 5] = [
    "timeout",
    "timed out",
    "unable to resolve host",
    "dns error",
    "error sending request",
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message shown to the user for a failed call.
    ///
    /// Transport failures collapse into [`NO_NETWORK_MESSAGE`]; everything
    /// else keeps its own text.
    pub fn user_message(&self) -> String {
        if let Error::Reqwest(err) = self {
            if err.is_timeout() || err.is_connect() {
                return NO_NETWORK_MESSAGE.to_string();
            }
        }
        network_aware_message(&self.to_string())
    }
}

/// Substitutes the generic offline message when `message` looks like a
/// connectivity failure.
pub fn network_aware_message(message: &str) -> String {
    let lowered = message.to_lowercase();
    if NETWORK_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        NO_NETWORK_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_)
            | Error::Migration(_)
            | Error::Database(_)
            | Error::Internal(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match &self {
            Error::BadRequest(msg) | Error::NotFound(msg) | Error::Internal(msg) => msg.clone(),
            Error::Reqwest(err) => format!("Exchange rate service error: {}", err),
            Error::Config(_) | Error::Migration(_) => {
                tracing::error!(error = %self, "Candidate tracker is misconfigured");
                "Service is not ready".to_string()
            }
            Error::Database(_) | Error::Validation(_) | Error::Json(_) | Error::Io(_) => {
                self.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Candidate not found".to_string()),
            other => Error::Database(other),
        }
    }
}
