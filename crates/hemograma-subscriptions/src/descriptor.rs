//! Subscription resource contract.
//!
//! The descriptor is the client-side view of the FHIR R4 `Subscription` we register:
//! which resources to watch and where the server should deliver them.

use serde::{Deserialize, Serialize};

/// Search criteria for newly recorded laboratory Observations.
pub const LABORATORY_CRITERIA: &str = "Observation?category=laboratory";

/// MIME type requested for notification payloads.
pub const FHIR_JSON: &str = "application/fhir+json";

pub const DEFAULT_REASON: &str = "Alerts for new blood count results";

/// Subscription status (FHIR R4 `Subscription.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Requested,
    Active,
    Off,
    Error,
    /// Value outside the R4 code set
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Active => "active",
            Self::Off => "off",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "requested" => Self::Requested,
            "active" => Self::Active,
            "off" => Self::Off,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery channel type. Only REST-hook is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    #[serde(rename = "rest-hook")]
    RestHook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionChannel {
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub endpoint: String,
    pub payload: String,
}

/// Client-side Subscription resource, serialized as the request body for create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDescriptor {
    pub resource_type: String,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub criteria: String,
    pub channel: SubscriptionChannel,
}

impl SubscriptionDescriptor {
    /// Descriptor for laboratory Observations delivered to `endpoint_url`.
    pub fn laboratory(endpoint_url: impl Into<String>) -> Self {
        Self {
            resource_type: "Subscription".to_string(),
            status: SubscriptionStatus::Requested,
            reason: Some(DEFAULT_REASON.to_string()),
            criteria: LABORATORY_CRITERIA.to_string(),
            channel: SubscriptionChannel {
                channel_type: ChannelType::RestHook,
                endpoint: endpoint_url.into(),
                payload: FHIR_JSON.to_string(),
            },
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.channel.endpoint
    }
}

/// Key for status and cancel calls, returned by a successful create.
///
/// Not persisted; the server is the only source of truth for its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionHandle {
    pub id: String,
    pub status: SubscriptionStatus,
}

/// Server-reported status of one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub id: String,
    /// `status` exactly as the server sent it, `"unknown"` if absent
    pub raw: String,
    pub status: SubscriptionStatus,
}

/// Result of a cancel that found the subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    pub id: String,
    /// Whether the server answered the update with a 2xx
    pub update_acknowledged: bool,
}
