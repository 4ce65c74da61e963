use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use hemograma_decoder::ObservationRecord;
use hemograma_subscriptions::FHIR_JSON;
use serde::Serialize;
use serde_json::{Value, json};

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

// ---- Subscription management ----

pub async fn create_subscription(State(state): State<AppState>) -> impl IntoResponse {
    match state.subscriptions.create_or_none(&state.callback_url).await {
        Some(handle) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Subscription created",
                "subscriptionId": handle.id,
            })),
        ),
        None => error_body("Failed to create subscription"),
    }
}

pub async fn subscription_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    // A server-reported "error" status is still a successful lookup.
    match state.subscriptions.status(&id).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "subscriptionId": report.id,
                "status": report.raw,
            })),
        ),
        Err(e) => {
            tracing::error!(
                subscription_id = %id,
                error = %e,
                "Failed to fetch subscription status"
            );
            error_body("Failed to fetch subscription status")
        }
    }
}

pub async fn list_subscriptions(State(state): State<AppState>) -> Response {
    match state.subscriptions.list_or_none().await {
        Some(body) => (StatusCode::OK, [(header::CONTENT_TYPE, FHIR_JSON)], body).into_response(),
        None => error_body("Failed to list subscriptions").into_response(),
    }
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.subscriptions.cancel_or_false(&id).await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Subscription cancelled",
                "subscriptionId": id,
            })),
        )
    } else {
        error_body("Failed to cancel subscription")
    }
}

pub async fn connectivity(State(state): State<AppState>) -> impl IntoResponse {
    let connected = state.subscriptions.test_connectivity().await;
    (
        StatusCode::OK,
        Json(json!({
            "connected": connected,
            "status": if connected { "OK" } else { "FAILED" },
            "server": state.subscriptions.server_url(),
        })),
    )
}

// ---- Notification callback ----

pub async fn receive_notification(body: Bytes) -> impl IntoResponse {
    tracing::info!(bytes = body.len(), "FHIR notification received");

    match hemograma_decoder::decode(&body) {
        Ok(records) => {
            if records.is_empty() {
                tracing::warn!("Notification carried no Observations");
            }
            records.iter().for_each(log_record);
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "observations": records.len(),
                    "records": records,
                })),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to decode FHIR notification");
            error_body(e.to_string())
        }
    }
}

fn log_record(record: &ObservationRecord) {
    tracing::info!(
        observation_id = %record.resource_id,
        status = %record.status,
        patient = record.patient_reference.as_deref().unwrap_or("N/A"),
        code = record.label(),
        kind = ?record.value_kind,
        measurements = record.measurements.len(),
        "Observation decoded"
    );
    for m in &record.measurements {
        tracing::info!(
            observation_id = %record.resource_id,
            component = %m.component_display,
            code = %m.component_code,
            value = m.value,
            unit = %m.unit,
            "Measurement"
        );
    }
}

fn error_body(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": "error",
            "message": message.into(),
        })),
    )
}
