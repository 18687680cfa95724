use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    /// Canvas could not be reached or rejected the request.
    BadGateway(String),
}

impl ApiError {
    /// Log an upstream failure with context and return a `BadGateway`.
    pub(crate) fn upstream(err: anyhow::Error, context: &str) -> Self {
        tracing::error!(error = %format!("{err:#}"), "{context}");
        Self::BadGateway(format!("{context}: {err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
        };
        (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
    }
}
