// File: crates/ridebook_booking/src/handlers.rs
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use ridebook_common::{handle_json_result, require_json, ErrorCategory, ErrorEnvelope};
use ridebook_platform::{BookingRecord, CheckoutTarget, FormReceipt};
use ridebook_session::SessionContext;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::logic::BookingOrchestrator;
use crate::models::{BookingConfirmation, BookingResult};

// Shared state for booking handlers
pub struct BookingState {
    pub orchestrator: BookingOrchestrator,
    pub session: SessionContext,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingConfirmation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

/// Booking creation answers with three statuses only: 400 for validation
/// failures, 500 for every other category. The category travels in the body.
fn failure_status(envelope: &ErrorEnvelope) -> StatusCode {
    match envelope.category() {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BookingResult {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BookingResult::Success(booking) => (
                StatusCode::OK,
                BookingResponse {
                    success: true,
                    booking: Some(booking),
                    error: None,
                },
            ),
            BookingResult::Failure(envelope) => (
                failure_status(&envelope),
                BookingResponse {
                    success: false,
                    booking: None,
                    error: Some(envelope),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingStatusResponse {
    pub success: bool,
    pub booking: BookingRecord,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    #[cfg_attr(feature = "openapi", schema(example = "https://checkout.example/rs-1"))]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FormResponse {
    pub success: bool,
    pub submission: FormReceipt,
}

/// Handler for creating a booking from a raw submission.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings", // Path relative to /api
    request_body(content = Object, description = "Booking submission, snake_case or camelCase keys"),
    responses(
        (status = 200, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid submission", body = BookingResponse),
        (status = 500, description = "Booking failed; `error.category` names the cause", body = BookingResponse)
    ),
    tag = "Booking"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    headers: HeaderMap,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let raw = match require_json(payload) {
        Ok(raw) => raw,
        Err(err) => return err.into_response(),
    };

    let mut store = state.session.open(&headers);
    let result = state.orchestrator.create_booking(&raw, &mut store).await;
    state.session.finish(&store, result)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings/{booking_id}", // Path relative to /api
    params(("booking_id" = String, Path, description = "Platform booking id")),
    responses(
        (status = 200, description = "Current booking state", body = BookingStatusResponse),
        (status = 400, description = "Malformed booking id", body = ridebook_common::ErrorEnvelope),
        (status = 404, description = "Booking not found")
    ),
    tag = "Booking"
))]
pub async fn get_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut store = state.session.open(&headers);
    let result = state
        .orchestrator
        .get_booking(&booking_id, &mut store)
        .await
        .map(|booking| BookingStatusResponse {
            success: true,
            booking,
        });
    state.session.finish(&store, handle_json_result(result))
}

/// Handler for starting a checkout for a booking or a slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/checkout", // Path relative to /api
    request_body = CheckoutTarget,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "Invalid checkout request", body = ridebook_common::ErrorEnvelope),
        (status = 503, description = "Checkout not configured or not permitted")
    ),
    tag = "Booking"
))]
pub async fn checkout_handler(
    State(state): State<Arc<BookingState>>,
    headers: HeaderMap,
    payload: Result<Json<CheckoutTarget>, JsonRejection>,
) -> Response {
    let target = match require_json(payload) {
        Ok(target) => target,
        Err(err) => return err.into_response(),
    };

    let mut store = state.session.open(&headers);
    let result = state
        .orchestrator
        .create_checkout(target, &mut store)
        .await
        .map(|session| CheckoutResponse {
            success: true,
            url: session.url,
            session_id: session.session_id,
        });
    state.session.finish(&store, handle_json_result(result))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/forms/{namespace}", // Path relative to /api
    params(("namespace" = String, Path, description = "Form namespace on the platform")),
    request_body(content = Object, description = "Form fields"),
    responses(
        (status = 200, description = "Submission stored", body = FormResponse),
        (status = 400, description = "Invalid submission", body = ridebook_common::ErrorEnvelope)
    ),
    tag = "Forms"
))]
pub async fn submit_form_handler(
    State(state): State<Arc<BookingState>>,
    Path(namespace): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let fields = match require_json(payload) {
        Ok(fields) => fields,
        Err(err) => return err.into_response(),
    };

    let mut store = state.session.open(&headers);
    let result = state
        .orchestrator
        .submit_form(&namespace, fields, &mut store)
        .await
        .map(|submission| FormResponse {
            success: true,
            submission,
        });
    state.session.finish(&store, handle_json_result(result))
}
