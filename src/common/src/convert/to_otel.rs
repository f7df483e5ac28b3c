//! Registry → OTLP document assembly
//!
//! Emits one resource, one scope, and one metric entry per family in
//! first-seen order. The family type picks the shape variant: counter →
//! monotonic cumulative sum, histogram → histogram, anything else → gauge.

use crate::config::ResourceConfig;

use super::otlp::{
    Gauge, Histogram, KeyValue, Metric, MetricsDocument, NumberDataPoint, Resource,
    ResourceMetrics, Scope, ScopeMetrics, Sum, AGGREGATION_TEMPORALITY_CUMULATIVE,
};
use super::types::{DataPoint, MetricFamily, MetricRegistry, MetricType};

/// Name of the instrumentation scope stamped onto the emitted document
pub const SCOPE_NAME: &str = "prometheus-receiver";
/// Version of the instrumentation scope
pub const SCOPE_VERSION: &str = "1.0.0";

/// Serialize a parsed registry into the OTLP JSON envelope. An empty registry
/// produces a well-formed document with an empty metrics list.
pub fn registry_to_otel(registry: &MetricRegistry, resource: &ResourceConfig) -> MetricsDocument {
    let metrics = registry.families().iter().map(family_to_metric).collect();

    MetricsDocument {
        resource_metrics: vec![ResourceMetrics {
            resource: Resource {
                attributes: vec![
                    KeyValue::string("service.name", &resource.service_name),
                    KeyValue::string("service.instance.id", &resource.service_instance_id),
                    KeyValue::string("source", "prometheus"),
                ],
            },
            scope_metrics: vec![ScopeMetrics {
                scope: Scope {
                    name: SCOPE_NAME.to_string(),
                    version: SCOPE_VERSION.to_string(),
                },
                metrics,
            }],
        }],
    }
}

fn family_to_metric(family: &MetricFamily) -> Metric {
    let data_points: Vec<NumberDataPoint> =
        family.data_points.iter().map(point_to_otel).collect();

    let mut metric = Metric {
        name: family.name.clone(),
        description: family.description.clone(),
        gauge: None,
        sum: None,
        histogram: None,
    };

    match family.metric_type {
        MetricType::Counter => {
            metric.sum = Some(Sum {
                data_points,
                aggregation_temporality: AGGREGATION_TEMPORALITY_CUMULATIVE,
                is_monotonic: true,
            });
        }
        MetricType::Histogram => {
            metric.histogram = Some(Histogram {
                data_points,
                aggregation_temporality: AGGREGATION_TEMPORALITY_CUMULATIVE,
            });
        }
        MetricType::Gauge => {
            metric.gauge = Some(Gauge { data_points });
        }
    }

    metric
}

fn point_to_otel(point: &DataPoint) -> NumberDataPoint {
    NumberDataPoint {
        attributes: point
            .attributes
            .iter()
            .map(|label| KeyValue::string(&label.key, &label.value))
            .collect(),
        time_unix_nano: point.time_unix_nano.to_string(),
        as_double: point.value,
        start_time_unix_nano: point.start_time_unix_nano.map(|t| t.to_string()),
    }
}
