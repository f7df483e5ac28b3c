//! Prometheus exposition → OTLP JSON conversion
//!
//! A single forward pass over the exposition text builds a [`MetricRegistry`]
//! (one family per sanitized metric name, data points in encounter order),
//! which is then serialized into the OTLP JSON metrics envelope. Malformed
//! lines are skipped rather than rejected; the only degenerate case is empty
//! input, which yields a document with an empty metrics list.

pub mod exposition;
pub mod otlp;
pub mod sanitize;
pub mod to_otel;
pub mod types;

pub use self::exposition::parse_exposition;
pub use self::sanitize::sanitize_exposition;
pub use self::to_otel::registry_to_otel;

use crate::config::ResourceConfig;
use self::otlp::MetricsDocument;

/// Convert a full Prometheus exposition response body into an OTLP JSON
/// metrics document. Pure apart from per-data-point clock reads.
pub fn convert(text: &str, resource: &ResourceConfig) -> MetricsDocument {
    let registry = parse_exposition(text);
    tracing::debug!(
        body_size = text.len(),
        family_count = registry.len(),
        "parsed Prometheus exposition text"
    );
    registry_to_otel(&registry, resource)
}
