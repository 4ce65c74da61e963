//! Decoding of FHIR notification payloads into blood count measurements.
//!
//! The FHIR server pushes either a single `Observation` or a `Bundle` of resources
//! to the subscription endpoint. [`decode`] classifies the body, walks every
//! Observation it contains and flattens each one into an [`ObservationRecord`]:
//!
//! - a composite panel (`component[]`, e.g. leukocytes, hemoglobin, platelets)
//!   yields one [`Measurement`] per component
//! - a simple Observation yields one measurement from its `valueQuantity`
//! - an Observation with neither yields no measurements
//!
//! Missing optional fields never fail decoding. Only a body that is not JSON, or
//! that has no `resourceType`, is rejected.

pub mod access;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod types;

pub use decoder::{PayloadKind, classify, decode, decode_observation, decode_value};
pub use error::{DecodeError, DecodeResult, MalformedReason};
pub use types::{Coding, Measurement, ObservationRecord, ValueKind};
