use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use hemograma_subscriptions::{HttpTransport, SubscriptionManager, TransportOptions};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, NOTIFICATION_PATH};
use crate::{handlers, middleware as app_middleware};

/// Shared state for the handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub subscriptions: SubscriptionManager,
    /// Notification URL registered on create
    pub callback_url: String,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let options = TransportOptions {
            timeout: cfg.fhir_timeout(),
            auth: cfg.fhir_auth(),
        };
        let transport = HttpTransport::new(&cfg.fhir.server_url, options)?;

        Ok(Self {
            subscriptions: SubscriptionManager::new(Arc::new(transport)),
            callback_url: cfg.callback_url(),
        })
    }
}

pub fn build_app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        // Subscription management
        .route(
            "/fhir-management/subscription",
            post(handlers::create_subscription),
        )
        .route(
            "/fhir-management/subscription/{id}",
            delete(handlers::cancel_subscription),
        )
        .route(
            "/fhir-management/subscription/{id}/status",
            get(handlers::subscription_status),
        )
        .route(
            "/fhir-management/subscriptions",
            get(handlers::list_subscriptions),
        )
        .route(
            "/fhir-management/connectivity",
            get(handlers::connectivity),
        )
        // Callback target registered with the FHIR server
        .route(NOTIFICATION_PATH, post(handlers::receive_notification))
        .with_state(state)
        // Middleware stack (innermost first: cors -> trace -> request id -> body limit)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        // Outside the trace layer so the span sees the id
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct HemogramaServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<HemogramaServer> {
        let addr = self.config.addr().map_err(anyhow::Error::msg)?;
        let state = AppState::from_config(&self.config)?;
        tracing::info!(
            fhir_server = %self.config.fhir.server_url,
            callback_url = %state.callback_url,
            "Subscription client configured"
        );
        let app = build_app(state, self.config.server.body_limit_bytes);

        Ok(HemogramaServer {
            addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HemogramaServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
