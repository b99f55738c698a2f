use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// One metric value as published on a state topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    /// Whole number (counters, gauges, indexes).
    Integer(i64),

    /// 64-bit counter above the signed range.
    Unsigned(u64),

    /// Scaled or derived value (dB, dBm, rates).
    Float(f64),

    /// Text value.
    Text(String),

    /// The value could not be determined this cycle.
    ///
    /// Published as an empty state payload.
    Unknown,
}

impl MetricValue {
    /// Whether this value is `Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, MetricValue::Unknown)
    }
}

/// Canonical text form used for state payloads.
///
/// Floats always carry a fractional part (`100.0`, `12.5`) and `Unknown`
/// renders as the empty string.
impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(n) => write!(f, "{}", n),
            MetricValue::Unsigned(n) => write!(f, "{}", n),
            MetricValue::Float(v) => write!(f, "{:?}", v),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Unknown => Ok(()),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

/// A single published metric of one interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataItem {
    /// Normalized (snake_case) field name, e.g. "if_in_octets".
    pub name: String,

    /// The measured value.
    pub value: MetricValue,

    /// Unit of measurement, when the field has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl DataItem {
    /// Create a data item without a unit.
    pub fn new(name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: None,
        }
    }

    /// Attach a unit of measurement.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// All metrics of one interface from one poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSnapshot {
    /// Display name (the interface description).
    pub name: String,

    /// Stable identity of the interface, e.g. `<host hash>-<mac>`.
    pub unique_id: String,

    /// Metrics in source field order.
    pub items: Vec<DataItem>,
}

impl DeviceSnapshot {
    /// Create an empty snapshot.
    pub fn new(name: impl Into<String>, unique_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
            items: Vec::new(),
        }
    }

    /// Find an item by its normalized name.
    pub fn item(&self, name: &str) -> Option<&DataItem> {
        self.items.iter().find(|item| item.name == name)
    }
}

/// Get the current time in fractional seconds since Unix epoch.
///
/// Returns 0.0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
