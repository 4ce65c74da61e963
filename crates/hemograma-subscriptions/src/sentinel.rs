//! Total variants of the lifecycle operations.
//!
//! Callers that treat every lifecycle call as infallible use these: errors are
//! logged and collapsed to `None`, `"error"` or `false`.

use crate::descriptor::SubscriptionHandle;
use crate::manager::SubscriptionManager;

/// Status string returned when the status could not be fetched.
pub const ERROR_STATUS: &str = "error";

impl SubscriptionManager {
    pub async fn create_or_none(&self, endpoint_url: &str) -> Option<SubscriptionHandle> {
        match self.create(endpoint_url).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, endpoint = endpoint_url, "Failed to create subscription");
                None
            }
        }
    }

    /// Server status string, `"unknown"` when the server omits it, `"error"` on failure.
    pub async fn status_or_error(&self, id: &str) -> String {
        match self.status(id).await {
            Ok(report) => report.raw,
            Err(e) => {
                tracing::error!(error = %e, subscription_id = %id, "Failed to fetch subscription status");
                ERROR_STATUS.to_string()
            }
        }
    }

    pub async fn list_or_none(&self) -> Option<Vec<u8>> {
        match self.list().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list subscriptions");
                None
            }
        }
    }

    pub async fn cancel_or_false(&self, id: &str) -> bool {
        match self.cancel(id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, subscription_id = %id, "Failed to cancel subscription");
                false
            }
        }
    }
}
