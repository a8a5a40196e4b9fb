//! Transport-level error taxonomy and its rendering into the error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::envelope::Envelope;
use crate::service::ServiceError;

const VALIDATION_MESSAGE: &str = "입력값 검증에 실패했습니다.";
const INTERNAL_MESSAGE: &str = "서버 내부 오류가 발생했습니다.";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body or path failed schema checks (422).
    #[error("{}", VALIDATION_MESSAGE)]
    Validation { details: Value },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    /// Anything unexpected. The source is logged, never sent to the client.
    #[error("{}", INTERNAL_MESSAGE)]
    Internal(#[source] BoxError),
}

impl ApiError {
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    /// Validation failure on a single body field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            details: json!([{ "loc": ["body", field], "msg": message.into() }]),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> String {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR".to_string(),
            Self::Internal(_) => "INTERNAL_SERVER_ERROR".to_string(),
            other => format!("HTTP_{}", other.status().as_u16()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            err @ ServiceError::InvalidUpdate => Self::BadRequest(err.to_string()),
            err @ ServiceError::NotFound(_) => Self::NotFound(err.to_string()),
            ServiceError::Repo(err) => Self::internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation {
            details: json!([{ "loc": ["body"], "msg": value.body_text() }]),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::Validation {
            details: json!([{ "loc": ["path"], "msg": value.body_text() }]),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            Self::Validation { details } => details.clone(),
            Self::Internal(source) => {
                error!(error = %source, "unhandled error while serving request");
                Value::Null
            }
            _ => Value::Null,
        };
        let body = Envelope::failure(self.code(), self.to_string(), details);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TitleError;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation(TitleError::Empty), StatusCode::BAD_REQUEST, "HTTP_400"),
            (ServiceError::InvalidUpdate, StatusCode::BAD_REQUEST, "HTTP_400"),
            (ServiceError::NotFound(1), StatusCode::NOT_FOUND, "HTTP_404"),
        ];
        for (service_err, status, code) in cases {
            let err = ApiError::from(service_err);
            assert_eq!(err.status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn validation_uses_its_own_code() {
        let err = ApiError::invalid_field("title", "too long");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn internal_message_hides_source() {
        let err = ApiError::internal("disk I/O error at /var/lib/todo.db");
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(err.to_string(), INTERNAL_MESSAGE);
    }
}
