// === PUBLIC CONTRACT ===
// The contract module is what other crates consume
pub mod contract;

// Re-export the public contract components
pub use contract::{client, model};

// === IMPLEMENTATIONS ===
pub mod gateways;
pub use gateways::remote::ShareLinkClient;

// Errors come straight from the transport; there is no module-specific taxonomy.
pub use modkit::TransportError;
