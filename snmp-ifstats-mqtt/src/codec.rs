//! Field codec: raw SNMP column values to typed values.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PollError, Result};

/// Columns holding raw hardware addresses.
pub const HEX_BYTE_FIELDS: &[&str] = &["ifPhysAddress"];

/// Column name suffixes that denote counters and gauges.
pub const INTEGER_FIELD_SUFFIXES: &[&str] = &[
    "Length",
    "Rate",
    "Delay",
    "Discards",
    "Errors",
    "Pkts",
    "QLen",
    "Speed",
    "Octets",
    "Atn",
    "SnrMgn",
    "Pwr",
    "UnknownProtos",
];

/// Integer columns not covered by a suffix.
pub const INTEGER_FIELDS: &[&str] = &["ifIndex", "ifMtu"];

static WORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));
static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// A typed column value.
///
/// Integers span both signed gauges and unsigned 64-bit counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i128),
}

impl FieldValue {
    /// Whether the value is zero, empty, or the text "0".
    pub fn is_empty_or_zero(&self) -> bool {
        match self {
            FieldValue::Integer(n) => *n == 0,
            FieldValue::Text(s) => s.is_empty() || s == "0",
        }
    }

    /// The integer, if this is one.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// The text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }
}

/// Convert a camelCase column name to snake_case.
///
/// ```
/// use snmp_ifstats_mqtt::codec::normalize_name;
///
/// assert_eq!(normalize_name("ifHCInOctets"), "if_hc_in_octets");
/// ```
pub fn normalize_name(identifier: &str) -> String {
    let split = WORD_START.replace_all(identifier, "${1}_${2}");
    LOWER_UPPER
        .replace_all(&split, "${1}_${2}")
        .to_lowercase()
}

/// Whether a column is parsed as an integer.
pub fn is_integer_field(identifier: &str) -> bool {
    INTEGER_FIELDS.contains(&identifier)
        || INTEGER_FIELD_SUFFIXES
            .iter()
            .any(|suffix| identifier.ends_with(suffix))
}

/// Cast the raw octets of a column into a typed value.
///
/// Hardware addresses become lowercase hex, numeric columns are parsed as
/// base-10 integers, everything else is text with trailing NULs removed.
pub fn cast_value(identifier: &str, raw: &[u8]) -> Result<FieldValue> {
    if HEX_BYTE_FIELDS.contains(&identifier) {
        return Ok(FieldValue::Text(hex::encode(raw)));
    }

    if is_integer_field(identifier) {
        let text = String::from_utf8_lossy(raw);
        return text
            .trim()
            .parse::<i128>()
            .ok()
            .filter(|n| (i64::MIN as i128..=u64::MAX as i128).contains(n))
            .map(FieldValue::Integer)
            .ok_or_else(|| PollError::malformed(identifier, text.into_owned()));
    }

    let text = String::from_utf8_lossy(raw);
    Ok(FieldValue::Text(text.trim_end_matches('\0').to_string()))
}
