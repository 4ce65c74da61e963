//! Client for the laboratory Observation subscription on a FHIR server.
//!
//! [`SubscriptionManager`] registers a REST-hook `Subscription` for
//! `Observation?category=laboratory`, polls its status, lists all subscriptions and
//! switches one off. It speaks to the server through a [`FhirTransport`];
//! [`HttpTransport`] is the `reqwest` implementation.
//!
//! Operations come in two forms: typed results (`create`, `status`, `list`,
//! `cancel`) and total variants that log and return a sentinel
//! (`create_or_none`, `status_or_error`, `list_or_none`, `cancel_or_false`).

pub mod descriptor;
pub mod error;
pub mod manager;
pub mod sentinel;
pub mod transport;

pub use descriptor::{
    CancelOutcome, ChannelType, FHIR_JSON, LABORATORY_CRITERIA, StatusReport,
    SubscriptionChannel, SubscriptionDescriptor, SubscriptionHandle, SubscriptionStatus,
};
pub use error::{SubscriptionError, SubscriptionResult};
pub use manager::SubscriptionManager;
pub use sentinel::ERROR_STATUS;
pub use transport::{AuthHeader, FhirTransport, HttpTransport, RawResponse, TransportOptions};
