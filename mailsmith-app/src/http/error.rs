use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mailsmith_core::error::{DispatchError, GenerationError};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema, Debug, Default)]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
    /// Status reported by the email provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Provider response body, parsed when it is JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
}

impl ErrorBody {
    fn message(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    MalformedBody(JsonRejection),
    Generation(GenerationError),
    Dispatch(DispatchError),
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::MalformedBody(value)
    }
}

impl From<GenerationError> for ApiError {
    fn from(value: GenerationError) -> Self {
        ApiError::Generation(value)
    }
}

impl From<DispatchError> for ApiError {
    fn from(value: DispatchError) -> Self {
        ApiError::Dispatch(value)
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MalformedBody(rejection) => {
                (StatusCode::BAD_REQUEST, ErrorBody::message(rejection.body_text()))
            }
            ApiError::Generation(error) => {
                (status_code(error.http_status()), ErrorBody::message(&error))
            }
            ApiError::Dispatch(error) => {
                let status = status_code(error.http_status());
                let body = match &error {
                    DispatchError::Provider(failure) => ErrorBody {
                        error: error.to_string(),
                        status: Some(failure.status),
                        reason: Some(failure.reason.clone()),
                        details: Some(failure.details.clone()),
                    },
                    _ => ErrorBody::message(&error),
                };
                (status, body)
            }
        };
        (status, Json(body)).into_response()
    }
}
