//! FHIR JSON field names and fallback values used by the decoder.
//!
//! Every literal that ties decoding to the server's JSON schema lives here, so a
//! schema change touches only this module.

// Resource types
pub const BUNDLE: &str = "Bundle";
pub const OBSERVATION: &str = "Observation";

// Envelope
pub const RESOURCE_TYPE: &str = "resourceType";
pub const ENTRY: &str = "entry";
pub const RESOURCE: &str = "resource";

// Observation
pub const ID: &str = "id";
pub const STATUS: &str = "status";
pub const CODE: &str = "code";
pub const SUBJECT: &str = "subject";
pub const REFERENCE: &str = "reference";
pub const COMPONENT: &str = "component";
pub const VALUE_QUANTITY: &str = "valueQuantity";

// CodeableConcept / Coding
pub const CODING: &str = "coding";
pub const SYSTEM: &str = "system";
pub const DISPLAY: &str = "display";

// Quantity
pub const VALUE: &str = "value";
pub const UNIT: &str = "unit";

/// Fallback for any absent textual field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fallback for an absent numeric quantity.
pub const MISSING_VALUE: f64 = 0.0;
