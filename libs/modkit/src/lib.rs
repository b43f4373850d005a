//! # ModKit - shared HTTP plumbing
//!
//! Everything a module needs to talk to a remote JSON API:
//!
//! - [`TracedClient`]: a `reqwest::Client` wrapper that opens an `outgoing_http`
//!   span and injects a W3C `traceparent` header on every request
//! - [`ApiTransport`]: the transport seam modules depend on, so tests can
//!   substitute an in-memory double
//! - [`HttpTransport`]: the reqwest-backed transport rooted at a base URL
//! - [`TransportError`]: the single error type surfaced to callers
//!
//! ## Example
//!
//! ```rust,ignore
//! use modkit::{ApiTransportExt, HttpTransport, TracedClient};
//!
//! let transport = HttpTransport::new(TracedClient::default(), base_url)?
//!     .with_bearer_token(token);
//! let body: serde_json::Value = transport.get_json(&["schedules", "s1", "share-links"]).await?;
//! ```

pub use async_trait::async_trait;

// HTTP utilities
pub mod http;

pub use http::client::TracedClient;
pub use http::error::TransportError;
pub use http::transport::{ApiRequest, ApiTransport, ApiTransportExt, HttpTransport, Method};
