//! Uniform response body: `{ flag, code, message, data }` with `code` mirroring the
//! HTTP status.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::service::ServiceError;

const INTERNAL_MESSAGE: &str = "A server internal error occurs.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub flag: bool,
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            flag: status.is_success(),
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidArgument(_)
            | ServiceError::Validation(_)
            | ServiceError::Upload(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, data) = match &self {
            ServiceError::Internal(cause) => {
                tracing::error!(error = %cause, "request failed");
                (INTERNAL_MESSAGE.to_string(), None)
            }
            ServiceError::Validation(errors) => {
                tracing::debug!(error = %errors, "validation failed");
                let fields: BTreeMap<String, String> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, problems)| {
                        let message = problems
                            .first()
                            .map(|problem| match &problem.message {
                                Some(message) => message.to_string(),
                                None => problem.code.to_string(),
                            })
                            .unwrap_or_default();
                        (field.to_string(), message)
                    })
                    .collect();
                (
                    "Provided arguments are invalid, see data for details.".to_string(),
                    serde_json::to_value(fields).ok(),
                )
            }
            other => (other.to_string(), None),
        };

        let body: ApiResponse<Value> = ApiResponse {
            flag: false,
            code: status.as_u16(),
            message,
            data,
        };
        (status, Json(body)).into_response()
    }
}
