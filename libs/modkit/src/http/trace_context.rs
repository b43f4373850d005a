//! W3C trace context helpers
//!
//! Generates W3C `traceparent` values and injects them into outgoing request
//! headers.

use http::{HeaderMap, HeaderName, HeaderValue};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

const VERSION: &str = "00";
const FLAGS_SAMPLED: &str = "01";

/// Generate a fresh `traceparent` value: `00-<trace-id>-<span-id>-01`.
pub fn new_traceparent() -> String {
    // All-zero ids are invalid in a traceparent; force at least one bit.
    let trace_id = rand::random::<u128>() | 1;
    let span_id = rand::random::<u64>() | 1;
    format!("{VERSION}-{trace_id:032x}-{span_id:016x}-{FLAGS_SAMPLED}")
}

/// Inject a new `traceparent` into `headers`, unless the caller already set one.
/// Returns the header value in effect.
pub fn inject_traceparent(headers: &mut HeaderMap) -> Option<String> {
    if let Some(existing) = headers.get(TRACEPARENT).and_then(|v| v.to_str().ok()) {
        return Some(existing.to_string());
    }

    let traceparent = new_traceparent();
    let value = HeaderValue::from_str(&traceparent).ok()?;
    headers.insert(HeaderName::from_static(TRACEPARENT), value);
    Some(traceparent)
}

/// Parse the trace id out of a `traceparent` header value.
pub fn parse_trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(VERSION), Some(trace_id), Some(_), Some(_)) if trace_id.len() == 32 => Some(trace_id),
        _ => None,
    }
}
