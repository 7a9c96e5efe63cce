//! HTTP error responses

use super::upload::UploadError;
use crate::error::RemovalError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors a handler can turn into a response
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Rejected upload, `400` with a JSON body
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Malformed or oversized multipart stream, status chosen by axum
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// Any failure after validation, `500`
    #[error("{source}")]
    Internal {
        source: RemovalError,
        /// Include the error message in the response body
        expose: bool,
    },
}

impl ApiError {
    #[must_use]
    pub fn internal(source: RemovalError, expose: bool) -> Self {
        Self::Internal { source, expose }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Upload(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            Self::Multipart(error) => {
                tracing::warn!(error = %error, "Rejected multipart body");
                (error.status(), error.body_text()).into_response()
            },
            Self::Internal { source, expose } => {
                tracing::error!(error = %source, "Request failed");
                let body = if expose {
                    source.to_string()
                } else {
                    "Internal Server Error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            },
        }
    }
}
