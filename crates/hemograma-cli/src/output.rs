use colored::Colorize;
use hemograma_decoder::ObservationRecord;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// One row per subscription in a search Bundle.
pub fn print_subscription_table(bundle: &Value) {
    let entries = bundle
        .get("entry")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if entries.is_empty() {
        println!("No subscriptions found.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Status", "Criteria", "Endpoint"]);
    for entry in entries {
        let resource = entry.get("resource").unwrap_or(entry);
        let text = |v: Option<&Value>| v.and_then(|v| v.as_str()).unwrap_or("-").to_string();
        builder.push_record([
            text(resource.get("id")),
            text(resource.get("status")),
            text(resource.get("criteria")),
            text(resource.get("channel").and_then(|c| c.get("endpoint"))),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    if let Some(total) = bundle.get("total").and_then(|v| v.as_u64()) {
        println!("Total: {total}");
    }
}

/// One row per measurement, grouped by Observation.
pub fn print_record_table(records: &[ObservationRecord]) {
    if records.is_empty() {
        println!("No Observations in payload.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Observation", "Patient", "Code", "Component", "Value", "Unit"]);
    for record in records {
        let patient = record.patient_reference.as_deref().unwrap_or("-");
        if record.measurements.is_empty() {
            builder.push_record([
                record.resource_id.as_str(),
                patient,
                record.label(),
                "-",
                "-",
                "-",
            ]);
        }
        for m in &record.measurements {
            let component = if m.component_display.is_empty() {
                record.label()
            } else {
                m.component_display.as_str()
            };
            let value = m.value.to_string();
            builder.push_record([
                record.resource_id.as_str(),
                patient,
                m.component_code.as_str(),
                component,
                value.as_str(),
                m.unit.as_str(),
            ]);
        }
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}
