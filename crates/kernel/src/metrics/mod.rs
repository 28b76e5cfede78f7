//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub status: u16,
}

/// Access gate outcome labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct GateLabels {
    pub outcome: String,
}

/// Login attempt labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LoginLabels {
    pub result: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// Gate decisions: authorized, unauthenticated, unauthorized.
    pub gate_decisions: Family<GateLabels, Counter>,

    /// Login attempts: success, invalid, no_access, error.
    pub login_attempts: Family<LoginLabels, Counter>,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let gate_decisions = Family::<GateLabels, Counter>::default();
        registry.register(
            "gate_decisions",
            "Access gate decisions by outcome",
            gate_decisions.clone(),
        );

        let login_attempts = Family::<LoginLabels, Counter>::default();
        registry.register(
            "login_attempts",
            "Login attempts by result",
            login_attempts.clone(),
        );

        Self {
            registry,
            http_requests,
            gate_decisions,
            login_attempts,
        }
    }

    /// Count one served request.
    pub fn record_request(&self, method: &str, status: u16) {
        self.http_requests
            .get_or_create(&HttpLabels {
                method: method.to_string(),
                status,
            })
            .inc();
    }

    /// Count one gate decision.
    pub fn record_gate(&self, outcome: &str) {
        self.gate_decisions
            .get_or_create(&GateLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Count one login attempt.
    pub fn record_login(&self, result: &str) {
        self.login_attempts
            .get_or_create(&LoginLabels {
                result: result.to_string(),
            })
            .inc();
    }

    /// Encode all metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
