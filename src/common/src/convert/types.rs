//! Internal types for the Prometheus → OTLP conversion
//!
//! These model the flat exposition format as a registry of typed metric
//! families, which is the intermediate form between line parsing and OTLP
//! document assembly.

use std::collections::HashMap;

/// Synthetic start-time window for counter data points. Prometheus exposition
/// carries no real start time, so counters get a fixed one-minute lookback.
pub const COUNTER_START_WINDOW_NANOS: u64 = 60 * 1_000_000_000;

/// Prometheus metric types the converter distinguishes. Anything else
/// (summary, untyped, absent TYPE line) stays at the gauge default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    #[default]
    Gauge,
    Counter,
    Histogram,
}

impl MetricType {
    /// Parse the type token of a `# TYPE` line. Unknown tokens map to the
    /// gauge default, which matches how they are serialized.
    pub fn from_token(token: &str) -> Self {
        match token {
            "counter" => Self::Counter,
            "histogram" => Self::Histogram,
            _ => Self::Gauge,
        }
    }
}

/// A single label key-value pair, in parse order, no de-duplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub key: String,
    pub value: String,
}

/// One observed sample attached to a family
#[derive(Debug, Clone)]
pub struct DataPoint {
    /// Label set of the sample line, in parse order
    pub attributes: Vec<Label>,
    pub value: f64,
    /// Wall-clock capture time at conversion, not the in-line Prometheus
    /// timestamp (which is parsed but discarded)
    pub time_unix_nano: u64,
    /// Only set when the owning family was counter-typed at the moment the
    /// point was built; always `time_unix_nano - COUNTER_START_WINDOW_NANOS`
    pub start_time_unix_nano: Option<u64>,
}

/// All samples sharing one sanitized metric name
#[derive(Debug, Clone)]
pub struct MetricFamily {
    /// Sanitized identifier (colons replaced with underscores)
    pub name: String,
    /// HELP text; empty if none was declared. Histogram component families
    /// inherit the base family's description at creation time.
    pub description: String,
    /// May be set after data points already exist; once set it governs the
    /// serialization of all accumulated points.
    pub metric_type: MetricType,
    /// Insertion order = encounter order in the input
    pub data_points: Vec<DataPoint>,
}

impl MetricFamily {
    pub fn new(name: String, description: String) -> Self {
        Self {
            name,
            description,
            metric_type: MetricType::default(),
            data_points: Vec::new(),
        }
    }
}

/// Registry of metric families built fresh for every conversion, preserving
/// first-seen order for serialization.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    families: Vec<MetricFamily>,
    index: HashMap<String, usize>,
    /// Descriptions of histogram base families, recorded at TYPE-line time
    /// and consulted only when a `_bucket`/`_count`/`_sum` component family
    /// is first created. Never mutated after insertion.
    histogram_descriptions: HashMap<String, String>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&MetricFamily> {
        self.index.get(name).map(|&i| &self.families[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MetricFamily> {
        self.index.get(name).map(|&i| &mut self.families[i])
    }

    /// Insert a new family. First-seen order is the serialization order.
    /// Returns a mutable reference to the stored family.
    pub fn insert(&mut self, family: MetricFamily) -> &mut MetricFamily {
        let idx = self.families.len();
        self.index.insert(family.name.clone(), idx);
        self.families.push(family);
        &mut self.families[idx]
    }

    pub fn record_histogram_description(&mut self, base_name: &str, description: &str) {
        self.histogram_descriptions
            .insert(base_name.to_string(), description.to_string());
    }

    pub fn histogram_description(&self, base_name: &str) -> Option<&str> {
        self.histogram_descriptions.get(base_name).map(|s| s.as_str())
    }

    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }
}

/// Replace colons in a raw metric name with underscores. Family identity is
/// the sanitized name, so `vllm:foo` and `vllm_foo` collide.
pub fn sanitize_metric_name(name: &str) -> String {
    name.replace(':', "_")
}

/// If `name` carries a histogram component suffix, return the base name it
/// was derived from.
pub fn histogram_base_name(name: &str) -> Option<&str> {
    for suffix in ["_bucket", "_count", "_sum"] {
        if let Some(base) = name.strip_suffix(suffix) {
            return Some(base);
        }
    }
    None
}
