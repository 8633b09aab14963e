use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

use crate::common::AuthError;
use crate::domains::dispatch::DispatchError;

/// API error with an HTTP status and a client-safe message.
///
/// Route handlers return `Result<_, ApiError>`; domain errors convert via
/// `From` so handlers can use `?` directly on action calls.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status = match &err {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::Conflict(_) => StatusCode::CONFLICT,
            DispatchError::StorageUnavailable(inner) => {
                // Internal detail stays in the logs; the wire message is generic.
                tracing::error!("Storage error: {:#}", inner);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => Self::unauthorized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_status_mapping() {
        let cases = [
            (
                DispatchError::Validation("bad input".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (DispatchError::NotFound("ambulance"), StatusCode::NOT_FOUND),
            (
                DispatchError::Conflict("already resolved".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                DispatchError::StorageUnavailable(anyhow::anyhow!("pool closed")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status, expected);
        }
    }

    #[test]
    fn test_not_found_message_names_the_resource() {
        let api_err = ApiError::from(DispatchError::NotFound("request"));
        assert_eq!(api_err.message, "request not found");
    }

    #[test]
    fn test_auth_error_maps_to_unauthorized() {
        let api_err = ApiError::from(AuthError::AuthenticationRequired);
        assert_eq!(api_err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api_err.message, "Authentication required");
    }
}
