// File: crates/ridebook_availability/src/handlers.rs
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use ridebook_common::{handle_json_result, require_json};
use ridebook_platform::{AvailabilityQuery, AvailabilitySlot, ServiceSummary};
use ridebook_session::SessionContext;
use serde::Serialize;
use std::sync::Arc;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::logic::AvailabilityEngine;

// Shared state for availability handlers
pub struct AvailabilityState {
    pub engine: AvailabilityEngine,
    pub session: SessionContext,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotResponse {
    pub success: bool,
    pub slot: AvailabilitySlot,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotListResponse {
    pub success: bool,
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ServiceListResponse {
    pub success: bool,
    pub services: Vec<ServiceSummary>,
}

/// Handler checking one exact slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/availability/slot", // Path relative to /api
    request_body = AvailabilityQuery,
    responses(
        (status = 200, description = "The requested slot", body = SlotResponse),
        (status = 400, description = "Invalid query", body = ridebook_common::ErrorEnvelope),
        (status = 404, description = "The platform does not know this slot"),
        (status = 502, description = "Scheduling platform failure")
    ),
    tag = "Availability"
))]
pub async fn slot_handler(
    State(state): State<Arc<AvailabilityState>>,
    headers: HeaderMap,
    payload: Result<Json<AvailabilityQuery>, JsonRejection>,
) -> Response {
    let query = match require_json(payload) {
        Ok(query) => query,
        Err(err) => return err.into_response(),
    };

    let mut store = state.session.open(&headers);
    let result = state
        .engine
        .query_slot(&query, &mut store)
        .await
        .map(|slot| SlotResponse {
            success: true,
            slot,
        });
    state.session.finish(&store, handle_json_result(result))
}

/// Handler listing all slots in a window.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/availability/list", // Path relative to /api
    request_body = AvailabilityQuery,
    responses(
        (status = 200, description = "Slots in the window, possibly none", body = SlotListResponse),
        (status = 400, description = "Invalid query", body = ridebook_common::ErrorEnvelope),
        (status = 502, description = "Scheduling platform failure")
    ),
    tag = "Availability"
))]
pub async fn list_handler(
    State(state): State<Arc<AvailabilityState>>,
    headers: HeaderMap,
    payload: Result<Json<AvailabilityQuery>, JsonRejection>,
) -> Response {
    let query = match require_json(payload) {
        Ok(query) => query,
        Err(err) => return err.into_response(),
    };

    let mut store = state.session.open(&headers);
    let result = state
        .engine
        .query_range(&query, &mut store)
        .await
        .map(|slots| SlotListResponse {
            success: true,
            slots,
        });
    state.session.finish(&store, handle_json_result(result))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/services", // Path relative to /api
    responses(
        (status = 200, description = "Bookable services", body = ServiceListResponse),
        (status = 502, description = "Scheduling platform failure")
    ),
    tag = "Availability"
))]
pub async fn services_handler(
    State(state): State<Arc<AvailabilityState>>,
    headers: HeaderMap,
) -> Response {
    let mut store = state.session.open(&headers);
    let result = state
        .engine
        .list_services(&mut store)
        .await
        .map(|services| ServiceListResponse {
            success: true,
            services,
        });
    state.session.finish(&store, handle_json_result(result))
}
