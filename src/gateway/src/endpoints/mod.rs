pub mod metrics;

pub use metrics::{cleaned_metrics, otel_metrics};
