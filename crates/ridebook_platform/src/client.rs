// --- File: crates/ridebook_platform/src/client.rs ---
use reqwest::{header, Client, Method};
use ridebook_common::SessionCredential;
use ridebook_config::PlatformConfig;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::PlatformError;
use crate::models::{
    AvailabilityQuery, AvailabilitySlot, BookingRecord, CheckoutSession, CheckoutSessionRequest,
    CheckoutTarget, FormReceipt, FormSubmission, IssuedToken, RemoteBookingPayload,
    ServiceSummary,
};
use crate::normalize;
use crate::service::{BoxFuture, SchedulingPlatform};
use crate::strategy::{plan, run_with_fallback, CredentialStrategy, Privilege};

pub const TOKEN_PATH: &str = "/oauth2/token";
pub const SERVICES_QUERY_PATH: &str = "/bookings/v2/services/query";
pub const AVAILABILITY_QUERY_PATH: &str = "/bookings/v2/availability/calendar/query";
pub const SLOT_AVAILABILITY_PATH: &str = "/bookings/v2/availability/slot";
pub const BOOKINGS_PATH: &str = "/bookings/v2/bookings";
pub const REDIRECT_SESSION_PATH: &str = "/redirect-session/v1/redirect-session";
pub const FORM_SUBMISSIONS_PATH: &str = "/form-submission-service/v4/submissions";

/// Longest remote error text kept for logging.
const MAX_ERROR_TEXT: usize = 512;

/// REST implementation of [`SchedulingPlatform`].
///
/// Holds the process-wide elevated credential, read once from config.
pub struct RestPlatformClient {
    http: Client,
    base_url: String,
    client_id: String,
    api_key: Option<CredentialStrategy>,
}

impl RestPlatformClient {
    pub fn new(http: Client, config: &PlatformConfig) -> Result<Self, PlatformError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(PlatformError::ConfigError(
                "platform.base_url is empty".to_string(),
            ));
        }

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .map(|key| CredentialStrategy::ApiKey {
                key,
                account_id: config.account_id.clone().filter(|id| !id.trim().is_empty()),
            });

        info!(
            "Platform client ready for {} (elevated key: {})",
            base_url,
            api_key.is_some()
        );

        Ok(Self {
            http,
            base_url,
            client_id: config.client_id.trim().to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request and returns the body of a 2xx response.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        credential: Option<&CredentialStrategy>,
    ) -> Result<String, PlatformError> {
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header(header::ACCEPT, "application/json");
        if let Some(credential) = credential {
            request = credential.apply(request);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("{} {} -> {}", method, path, status);

        if !status.is_success() {
            return Err(PlatformError::api(
                status.as_u16(),
                text.chars().take(MAX_ERROR_TEXT).collect::<String>(),
            ));
        }
        Ok(text)
    }

    /// Sends an authenticated request through the credential chain.
    async fn call(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
        session: Option<&SessionCredential>,
        privilege: Privilege,
    ) -> Result<String, PlatformError> {
        let strategies = plan(self.api_key.as_ref(), session, privilege);
        run_with_fallback(strategies, operation, |strategy| {
            let method = method.clone();
            let body = body.clone();
            async move {
                self.send(method, path, body.as_ref(), Some(&strategy))
                    .await
            }
        })
        .await
    }

    async fn token_grant(&self, grant: Value) -> Result<IssuedToken, PlatformError> {
        if self.client_id.is_empty() {
            return Err(PlatformError::ConfigError(
                "platform.client_id is not configured".to_string(),
            ));
        }
        let body = self
            .send(Method::POST, TOKEN_PATH, Some(&grant), None)
            .await?;
        normalize::token(&body)
    }
}

fn availability_body(query: &AvailabilityQuery) -> Value {
    let mut filter = json!({
        "serviceId": [query.service_id],
        "startDate": query.start_local,
        "endDate": query.end_local,
        "locationType": query.location_type,
    });
    if let Some(ids) = query.resource_ids.as_ref().filter(|ids| !ids.is_empty()) {
        filter["resourceId"] = json!(ids);
    }
    json!({
        "query": { "filter": filter },
        "timezone": query.time_zone,
    })
}

fn slot_body(query: &AvailabilityQuery) -> Value {
    let mut slot = json!({
        "serviceId": query.service_id,
        "startDate": query.start_local,
        "endDate": query.end_local,
        "timezone": query.time_zone,
        "location": { "locationType": query.location_type },
    });
    if let Some(id) = query.resource_ids.as_ref().and_then(|ids| ids.first()) {
        slot["resourceId"] = json!(id);
    }
    json!({ "slot": slot, "timezone": query.time_zone })
}

fn checkout_body(request: &CheckoutSessionRequest) -> Value {
    let checkout = match &request.target {
        CheckoutTarget::Booking { booking_id } => json!({ "bookingId": booking_id }),
        CheckoutTarget::Slot(query) => json!({
            "slotAvailability": slot_body(query),
            "timezone": query.time_zone,
        }),
    };
    json!({
        "bookingsCheckout": checkout,
        "callbacks": {
            "postFlowUrl": request.post_flow_url,
            "thankYouPageUrl": request.thank_you_url,
        },
    })
}

impl SchedulingPlatform for RestPlatformClient {
    fn issue_visitor_token(&self) -> BoxFuture<'_, IssuedToken, PlatformError> {
        Box::pin(async move {
            let grant = json!({ "clientId": self.client_id, "grantType": "anonymous" });
            self.token_grant(grant).await
        })
    }

    fn refresh_visitor_token(
        &self,
        refresh_token: &str,
    ) -> BoxFuture<'_, IssuedToken, PlatformError> {
        let refresh_token = refresh_token.to_string();
        Box::pin(async move {
            let grant = json!({
                "clientId": self.client_id,
                "grantType": "refresh_token",
                "refresh_token": refresh_token,
            });
            self.token_grant(grant).await
        })
    }

    fn query_services(
        &self,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Vec<ServiceSummary>, PlatformError> {
        let session = session.cloned();
        Box::pin(async move {
            let body = json!({ "query": { "paging": { "limit": 100 } } });
            let text = self
                .call(
                    "query services",
                    Method::POST,
                    SERVICES_QUERY_PATH,
                    Some(body),
                    session.as_ref(),
                    Privilege::Visitor,
                )
                .await?;
            normalize::services(&text)
        })
    }

    fn query_availability(
        &self,
        query: &AvailabilityQuery,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Vec<AvailabilitySlot>, PlatformError> {
        let body = availability_body(query);
        let session = session.cloned();
        Box::pin(async move {
            let text = self
                .call(
                    "query availability",
                    Method::POST,
                    AVAILABILITY_QUERY_PATH,
                    Some(body),
                    session.as_ref(),
                    Privilege::Visitor,
                )
                .await?;
            normalize::availability(&text)
        })
    }

    fn get_slot_availability(
        &self,
        query: &AvailabilityQuery,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Option<AvailabilitySlot>, PlatformError> {
        let body = slot_body(query);
        let session = session.cloned();
        Box::pin(async move {
            let result = self
                .call(
                    "get slot availability",
                    Method::POST,
                    SLOT_AVAILABILITY_PATH,
                    Some(body),
                    session.as_ref(),
                    Privilege::Visitor,
                )
                .await;
            match result {
                Ok(text) => normalize::slot(&text),
                Err(err) if err.is_not_found() => Ok(None),
                Err(err) => Err(err),
            }
        })
    }

    fn create_booking(
        &self,
        payload: &RemoteBookingPayload,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, BookingRecord, PlatformError> {
        let payload = serde_json::to_value(payload);
        let session = session.cloned();
        Box::pin(async move {
            let body = json!({
                "booking": payload?,
                "participantNotification": { "notifyParticipants": true },
            });
            let text = self
                .call(
                    "create booking",
                    Method::POST,
                    BOOKINGS_PATH,
                    Some(body),
                    session.as_ref(),
                    Privilege::Elevated,
                )
                .await?;
            normalize::booking(&text)
        })
    }

    fn get_booking(
        &self,
        booking_id: &str,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, BookingRecord, PlatformError> {
        let path = format!("{}/{}", BOOKINGS_PATH, booking_id);
        let session = session.cloned();
        Box::pin(async move {
            let text = self
                .call(
                    "get booking",
                    Method::GET,
                    &path,
                    None,
                    session.as_ref(),
                    Privilege::Elevated,
                )
                .await?;
            normalize::booking(&text)
        })
    }

    fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, CheckoutSession, PlatformError> {
        let body = checkout_body(request);
        let session = session.cloned();
        Box::pin(async move {
            let text = self
                .call(
                    "create checkout session",
                    Method::POST,
                    REDIRECT_SESSION_PATH,
                    Some(body),
                    session.as_ref(),
                    Privilege::Elevated,
                )
                .await?;
            normalize::checkout_session(&text)
        })
    }

    fn submit_form(
        &self,
        submission: &FormSubmission,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, FormReceipt, PlatformError> {
        let body = json!({
            "submission": {
                "namespace": submission.namespace,
                "submissions": submission.fields,
            }
        });
        let session = session.cloned();
        Box::pin(async move {
            let text = self
                .call(
                    "submit form",
                    Method::POST,
                    FORM_SUBMISSIONS_PATH,
                    Some(body),
                    session.as_ref(),
                    Privilege::Visitor,
                )
                .await?;
            normalize::form_receipt(&text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> AvailabilityQuery {
        AvailabilityQuery {
            service_id: "svc1".into(),
            start_local: "2025-07-01T09:00:00".into(),
            end_local: "2025-07-01T10:00:00".into(),
            time_zone: "America/Winnipeg".into(),
            location_type: "CUSTOMER".into(),
            resource_ids: Some(vec!["car-1".into()]),
        }
    }

    #[test]
    fn test_local_timestamps_pass_through_unchanged() {
        let body = availability_body(&query());
        assert_eq!(body["query"]["filter"]["startDate"], "2025-07-01T09:00:00");
        assert_eq!(body["query"]["filter"]["endDate"], "2025-07-01T10:00:00");
        assert_eq!(body["timezone"], "America/Winnipeg");
        assert_eq!(body["query"]["filter"]["resourceId"], json!(["car-1"]));
    }

    #[test]
    fn test_checkout_body_for_booking() {
        let body = checkout_body(&CheckoutSessionRequest {
            target: CheckoutTarget::Booking {
                booking_id: "bk1".into(),
            },
            post_flow_url: "https://site.example/booking".into(),
            thank_you_url: "https://site.example/booking/thank-you".into(),
        });
        assert_eq!(body["bookingsCheckout"]["bookingId"], "bk1");
        assert_eq!(
            body["callbacks"]["thankYouPageUrl"],
            "https://site.example/booking/thank-you"
        );
    }

    #[test]
    fn test_new_rejects_empty_base_url() {
        let config = PlatformConfig {
            base_url: "  ".into(),
            client_id: "cid".into(),
            api_key: None,
            account_id: None,
            timeout_secs: 5,
        };
        assert!(matches!(
            RestPlatformClient::new(Client::new(), &config),
            Err(PlatformError::ConfigError(_))
        ));
    }
}
