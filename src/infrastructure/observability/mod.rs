//! Pull-based observability: metrics are exposed on `GET /metrics` of the
//! HTTP API when enabled.

pub mod metrics;

pub use metrics::Metrics;
