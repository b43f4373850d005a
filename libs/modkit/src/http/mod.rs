//! HTTP utilities for modkit
//!
//! This module provides the outgoing HTTP client, the transport seam and the
//! trace context helpers shared by API modules.

pub mod client;
pub mod error;
pub mod trace_context;
pub mod transport;
