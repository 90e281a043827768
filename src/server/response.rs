use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

use crate::errors::{CoreError, CoreErrorKind};

/// Uniform response envelope. Every route, success or failure, returns this
/// shape; the HTTP status code is advisory on top of it.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn ok_empty(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
        })
    }
}

/// Error half of the envelope. Wraps `CoreError` so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(kind: CoreErrorKind) -> StatusCode {
    match kind {
        CoreErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        CoreErrorKind::NotFoundOrForbidden => StatusCode::NOT_FOUND,
        CoreErrorKind::Validation => StatusCode::BAD_REQUEST,
        CoreErrorKind::Conflict => StatusCode::CONFLICT,
        CoreErrorKind::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
        CoreErrorKind::Downstream => StatusCode::BAD_GATEWAY,
        CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        let body = json!({
            "success": false,
            "message": self.0.message(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(CoreErrorKind::NotFoundOrForbidden),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(CoreErrorKind::PreconditionFailed),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(status_for(CoreErrorKind::Downstream), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_api_error_debug_carries_the_wrapped_error() {
        let err = ApiError(CoreError::validation("name cannot be empty"));
        let rendered = format!("{:?}", err);
        assert!(rendered.contains("Validation"));
        assert!(rendered.contains("name cannot be empty"));
    }

    #[test]
    fn test_success_envelope_shape() {
        let Json(envelope) = ApiResponse::ok("Project created", json!({ "id": 1 }));
        assert!(envelope.success);
        assert_eq!(envelope.message, "Project created");
        assert_eq!(envelope.data, Some(json!({ "id": 1 })));
    }
}
