#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::SessionStatusResponse;
use ridebook_common::CredentialKind;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::session_status_handler,
        crate::handlers::logout_handler,
    ),
    components(schemas(SessionStatusResponse, CredentialKind)),
    tags(
        (name = "Session", description = "Visitor and member session credentials")
    )
)]
pub struct SessionApiDoc;
