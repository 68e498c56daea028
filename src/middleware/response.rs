use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Uniform JSON shape for every response: exactly one of `data`/`error` is set
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status_code: u16,
}

/// Success envelope; status defaults to 200
pub fn create_success_response<T: Serialize>(data: T, status: Option<StatusCode>) -> Envelope<T> {
    Envelope {
        success: true,
        data: Some(data),
        error: None,
        status_code: status.unwrap_or(StatusCode::OK).as_u16(),
    }
}

/// Error envelope; status defaults to 500
pub fn create_error_response(message: impl Into<String>, status: Option<StatusCode>) -> Envelope<Value> {
    Envelope {
        success: false,
        data: None,
        error: Some(message.into()),
        status_code: status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).as_u16(),
    }
}

/// Wrapper for handler results that renders the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self { data, status_code: None }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code: Some(status_code) }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);
        let envelope = create_success_response(self.data, Some(status));

        match serde_json::to_value(&envelope) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, Json(json!(create_error_response("Failed to serialize response data", Some(status)))))
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
