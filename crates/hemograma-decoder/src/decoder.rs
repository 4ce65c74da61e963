//! Notification decoding.
//!
//! A notification body is either a bare `Observation` or a `Bundle` whose entries
//! may hold Observations. Both normalize to a list of [`ObservationRecord`]s in
//! document order.

use serde_json::Value;

use crate::access::{array, f64_or, object, opt_str, str_or};
use crate::error::{DecodeError, DecodeResult};
use crate::fields::{self, MISSING_VALUE, NOT_AVAILABLE};
use crate::types::{Coding, Measurement, ObservationRecord, ValueKind};

/// Top-level classification of a notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Bundle,
    Observation,
    /// Any other resource type, e.g. a heartbeat or a Patient
    Unsupported,
}

impl From<&str> for PayloadKind {
    fn from(resource_type: &str) -> Self {
        match resource_type {
            fields::BUNDLE => Self::Bundle,
            fields::OBSERVATION => Self::Observation,
            _ => Self::Unsupported,
        }
    }
}

/// Decode a raw notification body.
///
/// Fails only when the bytes are not JSON or the document has no string
/// `resourceType`. Unsupported resource types decode to an empty list.
pub fn decode(raw: &[u8]) -> DecodeResult<Vec<ObservationRecord>> {
    let root: Value = serde_json::from_slice(raw).map_err(DecodeError::invalid_json)?;
    decode_value(&root)
}

/// Decode an already-parsed notification document.
pub fn decode_value(root: &Value) -> DecodeResult<Vec<ObservationRecord>> {
    let resource_type = root
        .get(fields::RESOURCE_TYPE)
        .and_then(Value::as_str)
        .ok_or_else(DecodeError::missing_resource_type)?;

    let records = match PayloadKind::from(resource_type) {
        PayloadKind::Bundle => decode_bundle(root),
        PayloadKind::Observation => vec![decode_observation(root)],
        PayloadKind::Unsupported => Vec::new(),
    };
    Ok(records)
}

/// Classify a body without decoding it.
pub fn classify(root: &Value) -> Option<PayloadKind> {
    root.get(fields::RESOURCE_TYPE)
        .and_then(Value::as_str)
        .map(PayloadKind::from)
}

fn decode_bundle(bundle: &Value) -> Vec<ObservationRecord> {
    array(bundle, fields::ENTRY)
        .iter()
        .filter_map(|entry| object(entry, fields::RESOURCE))
        .filter(|resource| {
            resource.get(fields::RESOURCE_TYPE).and_then(Value::as_str)
                == Some(fields::OBSERVATION)
        })
        .map(decode_observation)
        .collect()
}

/// Decode a single Observation node. Never fails; absent fields take fallbacks.
pub fn decode_observation(node: &Value) -> ObservationRecord {
    let codings: Vec<Coding> = object(node, fields::CODE)
        .map(|code| array(code, fields::CODING).iter().map(decode_coding).collect())
        .unwrap_or_default();

    let patient_reference =
        object(node, fields::SUBJECT).and_then(|subject| opt_str(subject, fields::REFERENCE));

    let (value_kind, measurements) = decode_values(node);

    ObservationRecord {
        resource_id: str_or(node, fields::ID, NOT_AVAILABLE),
        status: str_or(node, fields::STATUS, NOT_AVAILABLE),
        patient_reference,
        codings,
        measurements,
        value_kind,
    }
}

fn decode_coding(coding: &Value) -> Coding {
    Coding {
        system: str_or(coding, fields::SYSTEM, NOT_AVAILABLE),
        code: str_or(coding, fields::CODE, NOT_AVAILABLE),
        display: str_or(coding, fields::DISPLAY, NOT_AVAILABLE),
    }
}

// `component` wins over `valueQuantity` when both are present.
fn decode_values(node: &Value) -> (ValueKind, Vec<Measurement>) {
    if let Some(components) = node.get(fields::COMPONENT).and_then(Value::as_array) {
        let measurements = components.iter().map(decode_component).collect();
        return (ValueKind::Composite, measurements);
    }

    if let Some(quantity) = object(node, fields::VALUE_QUANTITY) {
        return (
            ValueKind::Simple,
            vec![quantity_measurement(String::new(), String::new(), Some(quantity))],
        );
    }

    (ValueKind::Empty, Vec::new())
}

fn decode_component(component: &Value) -> Measurement {
    let first_coding = object(component, fields::CODE)
        .and_then(|code| array(code, fields::CODING).first());

    let (code, display) = match first_coding {
        Some(coding) => (
            str_or(coding, fields::CODE, NOT_AVAILABLE),
            str_or(coding, fields::DISPLAY, NOT_AVAILABLE),
        ),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    quantity_measurement(code, display, object(component, fields::VALUE_QUANTITY))
}

fn quantity_measurement(
    component_code: String,
    component_display: String,
    quantity: Option<&Value>,
) -> Measurement {
    match quantity {
        Some(q) => Measurement {
            component_code,
            component_display,
            value: f64_or(q, fields::VALUE, MISSING_VALUE),
            unit: str_or(q, fields::UNIT, NOT_AVAILABLE),
            unit_system: str_or(q, fields::SYSTEM, NOT_AVAILABLE),
        },
        None => Measurement {
            component_code,
            component_display,
            value: MISSING_VALUE,
            unit: NOT_AVAILABLE.to_string(),
            unit_system: NOT_AVAILABLE.to_string(),
        },
    }
}
