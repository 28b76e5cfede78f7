//! HTTP middleware components.
//!
//! Page-entry enforcement and request metrics.

mod access_gate;
mod request_metrics;

pub use access_gate::enforce_access;
pub use request_metrics::track_requests;
