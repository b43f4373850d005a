//! Traced HTTP client that injects W3C trace context
//!
//! This module provides a wrapper around reqwest::Client that opens a span per
//! outgoing request and injects a `traceparent` header for distributed tracing.

use std::time::Duration;

use tracing::{field, Instrument, Level};

use crate::http::trace_context;

/// A traced HTTP client that injects trace context into outgoing requests.
#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    /// Create a new TracedClient wrapping the provided reqwest::Client
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Build a client with request and connect timeouts.
    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> reqwest::Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self::new(inner))
    }

    /// Execute a built reqwest::Request inside an `outgoing_http` span.
    /// The span records the trace id, the response status and an error flag.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let traceparent = trace_context::inject_traceparent(req.headers_mut());
        let trace_id = traceparent
            .as_deref()
            .and_then(trace_context::parse_trace_id)
            .unwrap_or_default()
            .to_string();

        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = field::Empty,
            trace_id = %trace_id,
            otel.kind = "client",
            error = field::Empty,
        );

        async {
            let response = self.inner.execute(req).await.inspect_err(|e| {
                tracing::Span::current().record("error", true);
                tracing::debug!(error = %e, "outgoing request failed");
            })?;

            let status = response.status();
            let span = tracing::Span::current();
            span.record("http.status_code", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                span.record("error", true);
            }
            Ok::<_, reqwest::Error>(response)
        }
        .instrument(span)
        .await
    }

    /// Build and execute a request prepared with [`TracedClient::request`].
    pub async fn send(&self, builder: reqwest::RequestBuilder) -> reqwest::Result<reqwest::Response> {
        let req = builder.build()?;
        self.execute(req).await
    }

    /// Create a request builder on the underlying client
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    /// Get a reference to the underlying reqwest::Client for advanced usage
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
