use serde::Serialize;

/// A single `code.coding[]` entry of an Observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

/// One measured value.
///
/// Component measurements carry the component's first coding; the synthetic
/// measurement of a simple Observation has empty `component_code` and
/// `component_display`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub component_code: String,
    pub component_display: String,
    pub value: f64,
    pub unit: String,
    /// `valueQuantity.system` (usually UCUM)
    pub unit_system: String,
}

/// Where an Observation's measurements came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `component[]` panel, one measurement per component
    Composite,
    /// Top-level `valueQuantity`
    Simple,
    /// Neither present
    Empty,
}

/// Normalized form of one Observation-shaped node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    pub resource_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_reference: Option<String>,
    pub codings: Vec<Coding>,
    pub measurements: Vec<Measurement>,
    pub value_kind: ValueKind,
}

impl ObservationRecord {
    /// True for a panel (e.g. a full blood count) decoded from `component[]`.
    pub fn is_composite(&self) -> bool {
        self.value_kind == ValueKind::Composite
    }

    /// Find a component measurement by its code, e.g. `"789-8"`.
    pub fn measurement(&self, component_code: &str) -> Option<&Measurement> {
        self.measurements
            .iter()
            .find(|m| m.component_code == component_code)
    }

    /// Display of the first coding, used as a human-readable label in logs.
    pub fn label(&self) -> &str {
        self.codings
            .first()
            .map(|c| c.display.as_str())
            .unwrap_or(crate::fields::NOT_AVAILABLE)
    }
}
