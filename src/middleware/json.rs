use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use crate::error::ApiError;

/// `Json<T>` whose rejections render as the error envelope instead of axum's
/// plain-text body. A missing content type is a 400 like any other bad body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::bad_request("Request body must be sent with Content-Type: application/json")
            }
            JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Request body is not valid JSON"),
            JsonRejection::JsonDataError(_) => ApiError::bad_request("Request body has an unexpected shape"),
            _ => ApiError::bad_request("Request body could not be read"),
        }
    }
}
