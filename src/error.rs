use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Request failure taxonomy. Not-found covers both a missing id and a record
/// the caller cannot see, so ownership never leaks through a distinct error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}")]
    Persistence {
        message: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("{message}")]
    Invalid {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn persistence(message: &'static str, source: mongodb::error::Error) -> Self {
        ApiError::Persistence { message, source }
    }

    pub fn invalid(message: &'static str, detail: impl ToString) -> Self {
        ApiError::Invalid {
            message,
            detail: detail.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence { .. } | ApiError::Invalid { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Unauthorized(message) | ApiError::NotFound(message) => {
                json!({ "message": message })
            }
            ApiError::Persistence { message, source } => {
                tracing::error!(error = %source, "{message}");
                json!({ "message": message, "error": source.to_string() })
            }
            ApiError::Invalid { message, detail } => {
                tracing::error!(error = %detail, "{message}");
                json!({ "message": message, "error": detail })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
