use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::source::SourceError;

/// Failures returned by the HTTP endpoints as `{message[, error]}` JSON.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Not Found")]
    NotFound,

    #[error("Permission denied")]
    Forbidden,

    /// Storage failure behind a public message.
    #[error("{message}")]
    Storage {
        message: &'static str,
        source: SourceError,
    },
}

#[derive(Serialize)]
struct Body {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::MalformedPayload => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::PermissionDenied(_) => ApiError::Forbidden,
            SourceError::InvalidCollection(_) => ApiError::MalformedPayload,
            other => ApiError::Storage {
                message: "Failed to save.",
                source: other,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            ApiError::Storage { source, .. } => Some(source.to_string()),
            _ => None,
        };
        let body = Body {
            message: self.to_string(),
            error,
        };
        (status, Json(body)).into_response()
    }
}
