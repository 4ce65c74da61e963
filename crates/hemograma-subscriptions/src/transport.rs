//! FHIR REST transport.
//!
//! The manager only needs "send this JSON to this path and hand back the raw
//! response". Non-2xx answers are returned as [`RawResponse`]s, not errors; only a
//! failed exchange is an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use serde_json::Value;

use crate::descriptor::FHIR_JSON;
use crate::error::{SubscriptionError, SubscriptionResult};

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> SubscriptionResult<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Minimal FHIR REST contract used by the subscription manager.
///
/// Paths are relative to the server base, e.g. `Subscription/42` or `metadata`.
#[async_trait]
pub trait FhirTransport: Send + Sync {
    async fn get(&self, path: &str) -> SubscriptionResult<RawResponse>;

    async fn post(&self, path: &str, body: &Value) -> SubscriptionResult<RawResponse>;

    async fn put(&self, path: &str, body: &Value) -> SubscriptionResult<RawResponse>;

    /// Base URL, for logging.
    fn base_url(&self) -> &str;
}

#[derive(Debug, Clone)]
pub enum AuthHeader {
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Options for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Whole-request timeout. `None` keeps the client default (no timeout).
    pub timeout: Option<Duration>,
    pub auth: Option<AuthHeader>,
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    http: Client,
    base_url: String,
    auth: Option<AuthHeader>,
}

impl HttpTransport {
    /// Create a transport for the FHIR base URL, e.g. `http://localhost:8080/fhir`.
    pub fn new(base_url: &str, options: TransportOptions) -> SubscriptionResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Self::with_client(http, base_url, options.auth)
    }

    /// Create with a custom client.
    pub fn with_client(
        http: Client,
        base_url: &str,
        auth: Option<AuthHeader>,
    ) -> SubscriptionResult<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| SubscriptionError::InvalidConfig(format!("invalid FHIR base URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SubscriptionError::InvalidConfig(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, self.url(path));
        match &self.auth {
            Some(AuthHeader::Basic { username, password }) => {
                req = req.basic_auth(username, Some(password));
            }
            Some(AuthHeader::Bearer { token }) => {
                req = req.bearer_auth(token);
            }
            None => {}
        }
        req.header(header::ACCEPT, FHIR_JSON)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> SubscriptionResult<RawResponse> {
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> SubscriptionResult<RawResponse> {
        let payload = serde_json::to_vec(body)?;
        let req = self
            .request(method, path)
            .header(header::CONTENT_TYPE, FHIR_JSON)
            .body(payload);
        self.send(req).await
    }
}

#[async_trait]
impl FhirTransport for HttpTransport {
    async fn get(&self, path: &str) -> SubscriptionResult<RawResponse> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post(&self, path: &str, body: &Value) -> SubscriptionResult<RawResponse> {
        self.send_json(Method::POST, path, body).await
    }

    async fn put(&self, path: &str, body: &Value) -> SubscriptionResult<RawResponse> {
        self.send_json(Method::PUT, path, body).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
