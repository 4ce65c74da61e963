//! Subscription lifecycle against a remote FHIR server.
//!
//! Every operation is a single round trip (cancel makes two: fetch, then update).
//! Nothing is cached; status always comes from the server. No retries.

use std::sync::Arc;

use serde_json::Value;

use crate::descriptor::{
    CancelOutcome, StatusReport, SubscriptionDescriptor, SubscriptionHandle, SubscriptionStatus,
};
use crate::error::{SubscriptionError, SubscriptionResult};
use crate::transport::{FhirTransport, RawResponse};

const SUBSCRIPTION: &str = "Subscription";
const METADATA: &str = "metadata";
const STATUS_FIELD: &str = "status";
const ID_FIELD: &str = "id";
const UNKNOWN_STATUS: &str = "unknown";

const HTTP_OK: u16 = 200;
const HTTP_CREATED: u16 = 201;

/// Creates, inspects, lists and deactivates the laboratory subscription.
#[derive(Clone)]
pub struct SubscriptionManager {
    transport: Arc<dyn FhirTransport>,
}

impl SubscriptionManager {
    pub fn new(transport: Arc<dyn FhirTransport>) -> Self {
        Self { transport }
    }

    pub fn server_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Register a laboratory Observation subscription delivering to `endpoint_url`.
    ///
    /// Succeeds only on `201 Created` with an `id` in the response body.
    pub async fn create(&self, endpoint_url: &str) -> SubscriptionResult<SubscriptionHandle> {
        let descriptor = SubscriptionDescriptor::laboratory(endpoint_url);
        tracing::info!(
            server = self.server_url(),
            endpoint = descriptor.endpoint(),
            criteria = %descriptor.criteria,
            "Creating subscription"
        );

        let body = serde_json::to_value(&descriptor)?;
        let resp = self.transport.post(SUBSCRIPTION, &body).await?;

        if resp.status != HTTP_CREATED {
            return Err(SubscriptionError::create_failed(format!(
                "server answered HTTP {}",
                resp.status
            )));
        }

        let created = resp
            .json()
            .map_err(|e| SubscriptionError::create_failed(format!("unreadable response: {e}")))?;

        let id = created
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SubscriptionError::create_failed("response has no id"))?
            .to_string();

        let status = created
            .get(STATUS_FIELD)
            .and_then(Value::as_str)
            .map(SubscriptionStatus::from)
            .unwrap_or(descriptor.status);

        tracing::info!(subscription_id = %id, status = %status, "Subscription created");
        Ok(SubscriptionHandle { id, status })
    }

    /// Fetch the server-reported status. Any non-200 answer is `NotFound`.
    pub async fn status(&self, id: &str) -> SubscriptionResult<StatusReport> {
        let id = checked_id(id)?;
        let resp = self.fetch(id).await?;
        let subscription = resp.json()?;

        let raw = subscription
            .get(STATUS_FIELD)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_STATUS)
            .to_string();

        tracing::info!(subscription_id = %id, status = %raw, "Subscription status fetched");
        Ok(StatusReport {
            id: id.to_string(),
            status: SubscriptionStatus::from(raw.as_str()),
            raw,
        })
    }

    /// Fetch the subscription collection, returning the server body untouched.
    pub async fn list(&self) -> SubscriptionResult<Vec<u8>> {
        tracing::info!(server = self.server_url(), "Listing subscriptions");
        let resp = self.transport.get(SUBSCRIPTION).await?;
        if resp.status != HTTP_OK {
            return Err(SubscriptionError::UnexpectedStatus {
                operation: "list",
                status: resp.status,
            });
        }
        Ok(resp.body)
    }

    /// Deactivate a subscription by setting its status to `off`.
    ///
    /// Fetches the current resource, flips `status`, and sends it back. Success is
    /// decided by the fetch; an unacknowledged update is only reported in
    /// [`CancelOutcome::update_acknowledged`].
    pub async fn cancel(&self, id: &str) -> SubscriptionResult<CancelOutcome> {
        let id = checked_id(id)?;
        tracing::info!(subscription_id = %id, "Cancelling subscription");

        let resp = self.fetch(id).await?;
        let mut subscription = resp.json()?;
        let Some(fields) = subscription.as_object_mut() else {
            return Err(SubscriptionError::ParseError(
                "subscription body is not a JSON object".into(),
            ));
        };
        fields.insert(
            STATUS_FIELD.to_string(),
            Value::String(SubscriptionStatus::Off.as_str().to_string()),
        );

        let update = self
            .transport
            .put(&resource_path(id), &subscription)
            .await?;

        let update_acknowledged = update.is_success();
        if update_acknowledged {
            tracing::info!(subscription_id = %id, "Subscription cancelled");
        } else {
            tracing::warn!(
                subscription_id = %id,
                status = update.status,
                "Subscription update not acknowledged; reporting cancel as done"
            );
        }

        Ok(CancelOutcome {
            id: id.to_string(),
            update_acknowledged,
        })
    }

    /// Probe `GET /metadata`. Any failure, including transport errors, is `false`.
    pub async fn test_connectivity(&self) -> bool {
        tracing::info!(server = self.server_url(), "Testing FHIR server connectivity");
        match self.transport.get(METADATA).await {
            Ok(resp) => {
                let connected = resp.status == HTTP_OK;
                tracing::info!(connected, status = resp.status, "Connectivity probe finished");
                connected
            }
            Err(e) => {
                tracing::error!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }

    async fn fetch(&self, id: &str) -> SubscriptionResult<RawResponse> {
        let resp = self.transport.get(&resource_path(id)).await?;
        if resp.status != HTTP_OK {
            tracing::debug!(subscription_id = %id, status = resp.status, "Subscription fetch failed");
            return Err(SubscriptionError::NotFound(id.to_string()));
        }
        Ok(resp)
    }
}

fn resource_path(id: &str) -> String {
    format!("{SUBSCRIPTION}/{id}")
}

/// FHIR logical ids are `[A-Za-z0-9\-\.]{1,64}`. Anything else cannot name a
/// subscription, so it is rejected without a round trip.
fn checked_id(id: &str) -> SubscriptionResult<&str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(id)
    } else {
        Err(SubscriptionError::NotFound(id.to_string()))
    }
}
