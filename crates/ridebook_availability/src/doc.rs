#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{ServiceListResponse, SlotListResponse, SlotResponse};
use ridebook_common::{ErrorCategory, ErrorEnvelope, Violation};
use ridebook_platform::{AvailabilityQuery, AvailabilitySlot, ServicePrice, ServiceSummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::slot_handler,
        crate::handlers::list_handler,
        crate::handlers::services_handler,
    ),
    components(schemas(
        AvailabilityQuery,
        AvailabilitySlot,
        SlotResponse,
        SlotListResponse,
        ServiceSummary,
        ServicePrice,
        ServiceListResponse,
        ErrorEnvelope,
        ErrorCategory,
        Violation
    )),
    tags(
        (name = "Availability", description = "Real-time slot availability and service catalog")
    )
)]
pub struct AvailabilityApiDoc;
