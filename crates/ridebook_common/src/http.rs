use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::envelope::{translate, ErrorCategory, Violation};
use crate::error::{validation_error, RidebookError};

// Include the client module
pub mod client;

/// Extension trait for RidebookError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for RidebookError {
    fn into_http_response(self) -> Response {
        let envelope = translate(&self);

        // Details stay in the log; the body only carries the envelope.
        if envelope.category() == ErrorCategory::Validation {
            debug!("Request rejected ({}): {}", envelope.category().as_str(), self);
        } else {
            error!("Request failed ({}): {}", envelope.category().as_str(), self);
        }

        let status_code = StatusCode::from_u16(envelope.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "success": false,
            "error": envelope,
        }));

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for RidebookError to make it easier to use in Axum handlers.
impl IntoResponse for RidebookError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// A utility function to convert a Result<T, RidebookError> to a Result<Json<T>, Response>.
pub fn handle_json_result<T>(result: Result<T, RidebookError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Turns an axum JSON extraction failure into a validation fault.
pub fn json_rejection_error(rejection: JsonRejection) -> RidebookError {
    validation_error(
        "Request body is not valid JSON for this endpoint",
        vec![Violation::new("body", rejection.body_text(), "json")],
    )
}

/// Unwraps an extracted JSON body, mapping a rejection to a VALIDATION response.
pub fn require_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RidebookError> {
    payload.map(|Json(value)| value).map_err(json_rejection_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{external_service_error, not_found};

    #[test]
    fn test_validation_error_response_status() {
        let response =
            validation_error("bad", vec![Violation::required("email")]).into_http_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_remote_failure_response_status() {
        assert_eq!(
            external_service_error("platform", 500, "boom")
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            not_found("booking b1").into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_handle_json_result_ok() {
        let result: Result<u32, RidebookError> = Ok(7);
        let Json(value) = handle_json_result(result).unwrap();
        assert_eq!(value, 7);
    }
}
