// src/server/error.rs
// =============================================================================
// Turns errors into `{ "error": "<message>" }` responses.
//
// The web form shows `error` to the user as-is, so messages are plain
// sentences: no stack traces, no debug output.
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::checker::CheckError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Check(CheckError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        Self::Check(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Check(err) => {
                let status = match &err {
                    CheckError::InvalidUrl { .. } | CheckError::Parse(_) => StatusCode::BAD_REQUEST,
                    CheckError::Fetch { .. } => StatusCode::BAD_GATEWAY,
                    CheckError::BatchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    CheckError::Client(_) => {
                        tracing::error!(error = %err, "link check failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };

                // Client errors carry reqwest's text, which is not for end users
                let message = match err {
                    CheckError::Client(_) => "Internal error while checking links".to_string(),
                    other => other.to_string(),
                };

                (status, message)
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
