//! Unit of measurement rules.
//!
//! Rules are evaluated top to bottom and the first match wins, so a field
//! such as `adslAtucCurrAtn` is reported in dB even though it is also an
//! ADSL field.

use ifstats_common::MetricValue;

use crate::codec::FieldValue;

/// How a rule matches a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Name ends with any of the suffixes.
    Suffix(&'static [&'static str]),
    /// Name starts with the prefix and ends with the suffix.
    PrefixSuffix(&'static str, &'static str),
}

impl Pattern {
    pub fn matches(&self, field: &str) -> bool {
        match self {
            Pattern::Suffix(suffixes) => suffixes.iter().any(|s| field.ends_with(s)),
            Pattern::PrefixSuffix(prefix, suffix) => {
                field.starts_with(prefix) && field.ends_with(suffix)
            }
        }
    }
}

/// One unit assignment rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRule {
    pub pattern: Pattern,
    pub unit: &'static str,
    /// Raw values are reported in fractions of the unit.
    pub divisor: Option<f64>,
}

const fn rule(pattern: Pattern, unit: &'static str, divisor: Option<f64>) -> UnitRule {
    UnitRule {
        pattern,
        unit,
        divisor,
    }
}

/// Ordered unit rules.
pub const UNIT_RULES: &[UnitRule] = &[
    rule(Pattern::Suffix(&["Octets", "Mtu"]), "bytes", None),
    rule(Pattern::Suffix(&["Atn", "SnrMgn"]), "dB", Some(10.0)),
    rule(Pattern::Suffix(&["Pwr"]), "dBm", Some(10.0)),
    rule(Pattern::Suffix(&["Pkts"]), "packets", None),
    rule(Pattern::Suffix(&["Discards", "Errors"]), "count", None),
    rule(Pattern::PrefixSuffix("adsl", "Rate"), "bits/s", None),
    rule(Pattern::Suffix(&["Speed"]), "bits/s", None),
];

/// First rule matching `field`.
pub fn rule_for(field: &str) -> Option<&'static UnitRule> {
    UNIT_RULES.iter().find(|rule| rule.pattern.matches(field))
}

/// Unit of `field`, if it has one.
pub fn unit_for(field: &str) -> Option<&'static str> {
    rule_for(field).map(|rule| rule.unit)
}

/// Convert a typed column value to its published value and unit.
///
/// Integers of scaled columns become floats; text is passed through.
pub fn apply(field: &str, value: &FieldValue) -> (MetricValue, Option<&'static str>) {
    let rule = rule_for(field);

    let value = match (value, rule.and_then(|r| r.divisor)) {
        (FieldValue::Integer(n), Some(divisor)) => MetricValue::Float(*n as f64 / divisor),
        (FieldValue::Integer(n), None) => integer_metric(*n),
        (FieldValue::Text(s), _) => MetricValue::Text(s.clone()),
    };

    (value, rule.map(|r| r.unit))
}

fn integer_metric(n: i128) -> MetricValue {
    if let Ok(v) = i64::try_from(n) {
        MetricValue::Integer(v)
    } else if let Ok(v) = u64::try_from(n) {
        MetricValue::Unsigned(v)
    } else {
        MetricValue::Float(n as f64)
    }
}
