use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crates::domain::errors::VideoError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const NOT_FOUND_MESSAGE: &str = "Video not found.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Video(#[from] VideoError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Video(err) => match err {
                VideoError::MissingFile => (StatusCode::BAD_REQUEST, err.to_string()),
                VideoError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
                VideoError::PayloadTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
                }
                VideoError::NotFound(_) => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
                VideoError::ParseFailure(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                VideoError::UpstreamFailure(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(status = %status, error = %message, "request failed");
        }

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error: message,
        });

        (status, body).into_response()
    }
}
