// --- File: crates/services/ridebook_backend/src/lib.rs ---
pub mod app_state;

use axum::{
    http::{header, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Merges every feature router under `/api` and adds the HTTP layers.
pub fn build_app(state: &AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health))
        .merge(ridebook_session::routes(state.session.clone()))
        .merge(ridebook_availability::routes(
            state.platform.clone(),
            state.session.clone(),
        ))
        .merge(ridebook_booking::routes(
            state.platform.clone(),
            state.session.clone(),
            state.config.checkout.clone(),
        ));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_ui());
    }

    // Credentials travel as a cookie, so the origin is mirrored instead of `*`.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    app.layer(cors).layer(TraceLayer::new_for_http())
}

#[cfg(feature = "openapi")]
fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    use ridebook_availability::doc::AvailabilityApiDoc;
    use ridebook_booking::doc::BookingApiDoc;
    use ridebook_session::doc::SessionApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Ridebook API",
            version = "0.1.0",
            description = "Ride booking orchestration API",
            license(name = "MIT", url = "https://opensource.org/licenses/MIT")
        ),
        components(),
        tags( (name = "Ridebook", description = "Core service endpoints")),
        servers( (url = "/api", description = "Main API Prefix")),
    )]
    struct ApiDoc;

    let mut openapi_doc = ApiDoc::openapi();
    openapi_doc.merge(SessionApiDoc::openapi());
    openapi_doc.merge(AvailabilityApiDoc::openapi());
    openapi_doc.merge(BookingApiDoc::openapi());
    tracing::info!("Adding Swagger UI at /api/docs");

    SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc)
}
