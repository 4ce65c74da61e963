use thiserror::Error;

/// Result type for subscription lifecycle operations.
pub type SubscriptionResult<T> = Result<T, SubscriptionError>;

/// Errors that can occur while managing the remote subscription.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// Server did not answer `201 Created`, or the response had no id
    #[error("Subscription create failed: {reason}")]
    CreateFailed { reason: String },

    /// Fetch by id did not return `200 OK`
    #[error("Subscription not found: {0}")]
    NotFound(String),

    /// Network, timeout or protocol failure talking to the server
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP {status} from {operation}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    /// Body was not the JSON shape the operation needs
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SubscriptionError {
    pub fn create_failed(reason: impl Into<String>) -> Self {
        Self::CreateFailed {
            reason: reason.into(),
        }
    }

    /// Whether the exchange itself failed, as opposed to the server answering
    /// with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for SubscriptionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for SubscriptionError {
    fn from(e: serde_json::Error) -> Self {
        Self::ParseError(e.to_string())
    }
}
