//! Transport seam between API modules and the network.
//!
//! Modules describe a call as an [`ApiRequest`] (method, path segments, JSON
//! body) and hand it to an [`ApiTransport`]. The production implementation is
//! [`HttpTransport`]; tests plug in an in-memory double instead.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::http::client::TracedClient;
use crate::http::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// One API call. `segments` are raw (unencoded) path segments relative to the
/// transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::Get,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    pub fn post<I, S>(segments: I, body: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::Post,
            segments: segments.into_iter().map(Into::into).collect(),
            body: Some(body),
        }
    }

    /// Unencoded path, e.g. `/schedules/s1/share`. For logs and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Issues a request and returns the parsed JSON body of a successful response.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// Typed helpers over any [`ApiTransport`].
#[async_trait]
pub trait ApiTransportExt: ApiTransport {
    async fn get_json<T>(&self, segments: &[&str]) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.send(ApiRequest::get(segments.iter().copied())).await?;
        serde_json::from_value(value).map_err(TransportError::Decode)
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, TransportError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let body = serde_json::to_value(body).map_err(TransportError::Encode)?;
        let value = self
            .send(ApiRequest::post(segments.iter().copied(), body))
            .await?;
        serde_json::from_value(value).map_err(TransportError::Decode)
    }
}

impl<T: ApiTransport + ?Sized> ApiTransportExt for T {}

/// reqwest-backed transport rooted at a base URL such as `https://host/api`.
#[derive(Clone)]
pub struct HttpTransport {
    client: TracedClient,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(client: TracedClient, base_url: Url) -> Result<Self, TransportError> {
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            bearer_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `segments` onto the base path, percent-encoding each one.
    ///
    /// URL parsing collapses `.` and `..` (encoded or not), so such a segment
    /// would address a different resource. Those are rejected instead.
    pub fn endpoint<I>(&self, segments: I) -> Result<Url, TransportError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let segments: Vec<I::Item> = segments.into_iter().collect();
        if let Some(dot) = segments
            .iter()
            .map(|s| AsRef::<str>::as_ref(s))
            .find(|s| matches!(*s, "." | ".."))
        {
            return Err(TransportError::UnaddressableSegment(dot.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.endpoint(&request.segments)?;
        tracing::debug!(method = ?request.method, %url, "sending API request");

        let mut builder = self
            .client
            .request(request.method.into(), url.as_str())
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = self.client.send(builder).await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(TransportError::Decode)
    }
}
