use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: MalformedReason },
}

/// Why a payload was rejected.
#[derive(Debug, Error)]
pub enum MalformedReason {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing resourceType")]
    MissingResourceType,
}

impl DecodeError {
    pub fn invalid_json(err: serde_json::Error) -> Self {
        Self::MalformedPayload {
            reason: MalformedReason::InvalidJson(err),
        }
    }

    pub fn missing_resource_type() -> Self {
        Self::MalformedPayload {
            reason: MalformedReason::MissingResourceType,
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
