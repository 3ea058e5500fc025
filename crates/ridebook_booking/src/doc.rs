#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{BookingResponse, BookingStatusResponse, CheckoutResponse, FormResponse};
use crate::models::BookingConfirmation;
use ridebook_common::{ErrorCategory, ErrorEnvelope, Violation};
use ridebook_platform::{AvailabilityQuery, BookingRecord, CheckoutTarget, FormReceipt};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_booking_handler,
        crate::handlers::get_booking_handler,
        crate::handlers::checkout_handler,
        crate::handlers::submit_form_handler,
    ),
    components(schemas(
        BookingConfirmation,
        BookingResponse,
        BookingRecord,
        BookingStatusResponse,
        CheckoutTarget,
        AvailabilityQuery,
        CheckoutResponse,
        FormReceipt,
        FormResponse,
        ErrorEnvelope,
        ErrorCategory,
        Violation
    )),
    tags(
        (name = "Booking", description = "Booking creation and checkout hand-off"),
        (name = "Forms", description = "Form submission ingestion")
    )
)]
pub struct BookingApiDoc;
