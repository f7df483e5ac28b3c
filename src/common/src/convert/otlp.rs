//! OTLP JSON metrics envelope
//!
//! Hand-modeled serde types for the document shape the gateway emits:
//! resource → scope → metric → data points. Field names follow the OTLP JSON
//! mapping (camelCase, nanosecond timestamps encoded as decimal strings).

use serde::Serialize;

/// `AGGREGATION_TEMPORALITY_CUMULATIVE` in the OTLP enum
pub const AGGREGATION_TEMPORALITY_CUMULATIVE: i32 = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDocument {
    pub resource_metrics: Vec<ResourceMetrics>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub resource: Resource,
    pub scope_metrics: Vec<ScopeMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeMetrics {
    pub scope: Scope,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    pub name: String,
    pub version: String,
}

/// One metric entry. Exactly one of the three shape variants is present,
/// keyed by the family's type.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge: Option<Gauge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<Sum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Histogram>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gauge {
    pub data_points: Vec<NumberDataPoint>,
}

/// Monotonic cumulative sum shape used for counter families
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sum {
    pub data_points: Vec<NumberDataPoint>,
    pub aggregation_temporality: i32,
    pub is_monotonic: bool,
}

/// Histogram shape. Bucket/count/sum component families are emitted as
/// separate flat metrics, so this carries plain number points rather than
/// reassembled OTLP histogram points.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub data_points: Vec<NumberDataPoint>,
    pub aggregation_temporality: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberDataPoint {
    pub attributes: Vec<KeyValue>,
    /// Nanoseconds since the Unix epoch, decimal-string encoded
    pub time_unix_nano: String,
    pub as_double: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_unix_nano: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AnyValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnyValue {
    pub string_value: String,
}

impl KeyValue {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: AnyValue {
                string_value: value.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_data_point_field_names() {
        let point = NumberDataPoint {
            attributes: vec![KeyValue::string("method", "GET")],
            time_unix_nano: "123".to_string(),
            as_double: 42.0,
            start_time_unix_nano: None,
        };

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["timeUnixNano"], "123");
        assert_eq!(json["asDouble"], 42.0);
        assert_eq!(json["attributes"][0]["key"], "method");
        assert_eq!(json["attributes"][0]["value"]["stringValue"], "GET");
        // No startTimeUnixNano key at all when absent
        assert!(json.get("startTimeUnixNano").is_none());
    }

    #[test]
    fn test_metric_shape_variants_are_exclusive() {
        let metric = Metric {
            name: "req_total".to_string(),
            description: String::new(),
            gauge: None,
            sum: Some(Sum {
                data_points: vec![],
                aggregation_temporality: AGGREGATION_TEMPORALITY_CUMULATIVE,
                is_monotonic: true,
            }),
            histogram: None,
        };

        let json = serde_json::to_value(&metric).unwrap();
        assert!(json.get("gauge").is_none());
        assert!(json.get("histogram").is_none());
        assert_eq!(json["sum"]["aggregationTemporality"], 2);
        assert_eq!(json["sum"]["isMonotonic"], true);
    }
}
