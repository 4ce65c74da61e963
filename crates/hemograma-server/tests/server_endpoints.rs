use hemograma_server::{AppConfig, AppState, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK: &str = "http://lab.test/hemogramas/notifications";

async fn start_server(
    fhir_url: &str,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let mut cfg = AppConfig::default();
    cfg.fhir.server_url = fhir_url.to_string();
    start_server_with(cfg).await
}

async fn start_server_with(
    mut cfg: AppConfig,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    cfg.callback.public_url = Some(CALLBACK.to_string());
    let state = AppState::from_config(&cfg).expect("state");
    let app = build_app(state, cfg.server.body_limit_bytes);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

async fn start_with_fhir() -> (MockServer, String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let fhir = MockServer::start().await;
    let (base, tx, handle) = start_server(&format!("{}/fhir", fhir.uri())).await;
    (fhir, base, tx, handle)
}

#[tokio::test]
async fn healthz_and_request_id() {
    let (_fhir, base, shutdown_tx, handle) = start_with_fhir().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client
        .get(format!("{base}/healthz"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "abc-123");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn create_subscription_registers_callback_url() {
    let (fhir, base, shutdown_tx, handle) = start_with_fhir().await;

    Mock::given(method("POST"))
        .and(path("/fhir/Subscription"))
        .and(body_partial_json(json!({"channel": {"endpoint": CALLBACK}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "resourceType": "Subscription", "id": "sub-1", "status": "requested"
        })))
        .expect(1)
        .mount(&fhir)
        .await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/fhir-management/subscription"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["subscriptionId"], "sub-1");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn create_subscription_failure_is_bad_request() {
    let (fhir, base, shutdown_tx, handle) = start_with_fhir().await;

    Mock::given(method("POST"))
        .and(path("/fhir/Subscription"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fhir)
        .await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/fhir-management/subscription"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn status_list_and_cancel() {
    let (fhir, base, shutdown_tx, handle) = start_with_fhir().await;
    let client = reqwest::Client::new();
    let stored = json!({"resourceType": "Subscription", "id": "sub-1", "status": "active"});

    Mock::given(method("GET"))
        .and(path("/fhir/Subscription/sub-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&stored))
        .mount(&fhir)
        .await;
    Mock::given(method("GET"))
        .and(path("/fhir/Subscription/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fhir)
        .await;
    Mock::given(method("GET"))
        .and(path("/fhir/Subscription"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"resourceType": "Bundle", "type": "searchset", "entry": [{"resource": stored}]})),
        )
        .mount(&fhir)
        .await;
    Mock::given(method("PUT"))
        .and(path("/fhir/Subscription/sub-1"))
        .and(body_partial_json(json!({"status": "off"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&fhir)
        .await;

    // status
    let body: Value = client
        .get(format!("{base}/fhir-management/subscription/sub-1/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"subscriptionId": "sub-1", "status": "active"}));

    // status of a missing subscription is a client error
    let resp = client
        .get(format!("{base}/fhir-management/subscription/missing/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Failed to fetch subscription status");

    // list passes the server body through
    let resp = client
        .get(format!("{base}/fhir-management/subscriptions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/fhir+json");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["resourceType"], "Bundle");
    assert_eq!(body["entry"][0]["resource"]["id"], "sub-1");

    // cancel
    let resp = client
        .delete(format!("{base}/fhir-management/subscription/sub-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");

    let resp = client
        .delete(format!("{base}/fhir-management/subscription/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn list_failure_is_bad_request() {
    let (fhir, base, shutdown_tx, handle) = start_with_fhir().await;

    Mock::given(method("GET"))
        .and(path("/fhir/Subscription"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&fhir)
        .await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/fhir-management/subscriptions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn connectivity_reports_server() {
    let (fhir, base, shutdown_tx, handle) = start_with_fhir().await;

    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceType": "CapabilityStatement"})))
        .mount(&fhir)
        .await;

    let body: Value = reqwest::Client::new()
        .get(format!("{base}/fhir-management/connectivity"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connected"], true);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["server"], format!("{}/fhir", fhir.uri()));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn notification_is_decoded() {
    let (_fhir, base, shutdown_tx, handle) = start_with_fhir().await;
    let client = reqwest::Client::new();

    let bundle = json!({
        "resourceType": "Bundle",
        "type": "history",
        "entry": [
            {"resource": {
                "resourceType": "Observation",
                "id": "hemo-1",
                "status": "final",
                "subject": {"reference": "Patient/p1"},
                "component": [
                    {"code": {"coding": [{"code": "789-8", "display": "Leukocytes"}]},
                     "valueQuantity": {"value": 5.4, "unit": "10*3/uL"}},
                    {"code": {"coding": [{"code": "718-7", "display": "Hemoglobin"}]},
                     "valueQuantity": {"value": 13.1, "unit": "g/dL"}}
                ]
            }},
            {"resource": {"resourceType": "Patient", "id": "p1"}}
        ]
    });

    let resp = client
        .post(format!("{base}/hemogramas/notifications"))
        .header("content-type", "application/fhir+json")
        .json(&bundle)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["observations"], 1);
    assert_eq!(body["records"][0]["resourceId"], "hemo-1");
    assert_eq!(body["records"][0]["measurements"][1]["componentDisplay"], "Hemoglobin");

    // Heartbeat-style payloads are accepted and ignored
    let resp = client
        .post(format!("{base}/hemogramas/notifications"))
        .json(&json!({"resourceType": "Parameters"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["observations"], 0);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn malformed_notification_is_rejected() {
    let (_fhir, base, shutdown_tx, handle) = start_with_fhir().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/hemogramas/notifications"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");

    let resp = client
        .post(format!("{base}/hemogramas/notifications"))
        .json(&json!({"id": "no-type"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Malformed payload: missing resourceType");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn server_reported_error_status_is_passed_through() {
    let (fhir, base, shutdown_tx, handle) = start_with_fhir().await;

    Mock::given(method("GET"))
        .and(path("/fhir/Subscription/sub-err"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Subscription", "id": "sub-err", "status": "error"
        })))
        .mount(&fhir)
        .await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/fhir-management/subscription/sub-err/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"subscriptionId": "sub-err", "status": "error"}));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn basic_credentials_reach_fhir_server() {
    let fhir = MockServer::start().await;
    let mut cfg = AppConfig::default();
    cfg.fhir.server_url = format!("{}/fhir", fhir.uri());
    cfg.fhir.username = Some("lab".into());
    cfg.fhir.password = Some("secret".into());
    let (base, shutdown_tx, handle) = start_server_with(cfg).await;

    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .and(header("authorization", "Basic bGFiOnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&fhir)
        .await;

    let body: Value = reqwest::Client::new()
        .get(format!("{base}/fhir-management/connectivity"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connected"], true);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
