use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orderwatch_core::errors::Error as CoreError;
use orderwatch_core::job_orders::JobOrderError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
}

/// JSON body extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::JobOrder(JobOrderError::DuplicateKey(_)) => StatusCode::CONFLICT,
                CoreError::JobOrder(JobOrderError::NotFound(_)) => StatusCode::NOT_FOUND,
                CoreError::JobOrder(JobOrderError::InvalidQuantity { .. }) => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Stream(_) => StatusCode::SERVICE_UNAVAILABLE,
                e if e.is_store_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use orderwatch_core::errors::{DatabaseError, ValidationError};
    use orderwatch_core::mirror::StreamError;

    #[test]
    fn test_core_errors_map_to_statuses() {
        let cases = [
            (
                CoreError::from(JobOrderError::DuplicateKey("JO-1".into())),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::from(JobOrderError::NotFound("JO-1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::from(JobOrderError::InvalidQuantity {
                    order_number: "JO-1".into(),
                    current_qty: 9,
                    desired_qty: 5,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::from(ValidationError::MissingField("orderNumber".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::from(DatabaseError::ConnectionFailed("refused".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::from(StreamError::Connect("refused".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::from(DatabaseError::QueryFailed("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
