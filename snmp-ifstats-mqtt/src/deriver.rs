//! Metric derivation: field selection, units, identities and byte rates.

use std::collections::HashMap;

use ifstats_common::{DataItem, DeviceSnapshot, MetricValue};

use crate::assembler::{InterfaceMap, TypedFieldSet};
use crate::codec::{FieldValue, normalize_name};
use crate::units;

/// Columns never published.
pub const IGNORE_FIELDS: &[&str] = &["ifSpecific", "ifIndex", "ifType"];

/// Columns skipped when zero or empty.
pub const HIDE_IF_EMPTY: &[&str] = &["ifSpeed", "ifLastChange", "ifPhysAddress"];

/// Column holding the hardware address used for identity.
pub const HARDWARE_ADDRESS_FIELD: &str = "ifPhysAddress";

/// Columns that get a derived rate.
pub const RATE_SOURCE_SUFFIX: &str = "Octets";

/// Appended to a counter name to name its rate.
pub const RATE_SUFFIX: &str = "PS";

/// Unit of derived rates.
pub const RATE_UNIT: &str = "bytes/s";

/// Last seen value of one counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    pub timestamp: f64,
    pub value: i128,
}

/// Counter samples keyed by (interface name, column).
pub type RateCache = HashMap<(String, String), RateSample>;

/// Outcome of a rate computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    Known(f64),
    /// Counter went backwards or the clock did not advance.
    Unknown,
}

impl From<Rate> for MetricValue {
    fn from(rate: Rate) -> Self {
        match rate {
            Rate::Known(v) => MetricValue::Float(v),
            Rate::Unknown => MetricValue::Unknown,
        }
    }
}

/// Per-second rate between two samples of a counter.
pub fn compute_rate(previous: &RateSample, current: &RateSample) -> Rate {
    let delta = current.value - previous.value;
    let elapsed = current.timestamp - previous.timestamp;

    if delta >= 0 && elapsed > 0.0 {
        Rate::Known(delta as f64 / elapsed)
    } else {
        Rate::Unknown
    }
}

/// Stable identity of one interface.
///
/// The hardware address is used when present, else the name prefixed with
/// `_`.
pub fn unique_id(id_prefix: &str, name: &str, fields: &TypedFieldSet) -> String {
    match fields.get(HARDWARE_ADDRESS_FIELD).and_then(FieldValue::as_text) {
        Some(mac) if !mac.is_empty() => format!("{}-{}", id_prefix, mac),
        _ => format!("{}-_{}", id_prefix, name),
    }
}

fn is_hidden(field: &str, value: &FieldValue) -> bool {
    IGNORE_FIELDS.contains(&field) || (HIDE_IF_EMPTY.contains(&field) && value.is_empty_or_zero())
}

/// Turns typed interface fields into publishable snapshots.
///
/// Owns the rate cache of one device.
#[derive(Debug, Clone)]
pub struct MetricDeriver {
    id_prefix: String,
    rate_cache: RateCache,
}

impl MetricDeriver {
    /// Create a deriver for the device whose host hash is `id_prefix`.
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            rate_cache: RateCache::new(),
        }
    }

    pub fn rate_cache(&self) -> &RateCache {
        &self.rate_cache
    }

    /// Derive one snapshot per interface at time `now` (seconds).
    ///
    /// The rate cache is replaced by the samples of this call, so counters
    /// of interfaces that disappeared are forgotten.
    pub fn derive(&mut self, interfaces: &InterfaceMap, now: f64) -> Vec<DeviceSnapshot> {
        let mut next_cache = RateCache::new();
        let mut snapshots = Vec::with_capacity(interfaces.len());

        for (name, fields) in interfaces {
            let mut snapshot = DeviceSnapshot::new(name, unique_id(&self.id_prefix, name, fields));

            for (field, value) in fields {
                if is_hidden(field, value) {
                    continue;
                }

                let (metric, unit) = units::apply(field, value);
                let mut item = DataItem::new(normalize_name(field), metric);
                item.unit = unit.map(str::to_string);
                snapshot.items.push(item);

                if !field.ends_with(RATE_SOURCE_SUFFIX) {
                    continue;
                }
                let Some(counter) = value.as_integer() else {
                    continue;
                };

                let key = (name.clone(), field.clone());
                let current = RateSample {
                    timestamp: now,
                    value: counter,
                };

                if let Some(previous) = self.rate_cache.get(&key) {
                    let rate = compute_rate(previous, &current);
                    if rate == Rate::Unknown {
                        tracing::debug!(
                            interface = %name,
                            field = %field,
                            previous = %previous.value,
                            current = %counter,
                            "Counter reset or stalled clock, rate unknown"
                        );
                    }
                    snapshot.items.push(
                        DataItem::new(normalize_name(&format!("{}{}", field, RATE_SUFFIX)), rate)
                            .with_unit(RATE_UNIT),
                    );
                }

                next_cache.insert(key, current);
            }

            snapshots.push(snapshot);
        }

        self.rate_cache = next_cache;
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "c5eb5a4cc76a5cdb16e79864b9ccd26c";

    fn eth0(in_octets: i128) -> InterfaceMap {
        let mut fields = TypedFieldSet::new();
        fields.insert("ifIndex".into(), FieldValue::Integer(1));
        fields.insert("ifType".into(), FieldValue::Text("6".into()));
        fields.insert("ifDescr".into(), FieldValue::Text("eth0".into()));
        fields.insert("ifPhysAddress".into(), FieldValue::Text("001122334455".into()));
        fields.insert("ifMtu".into(), FieldValue::Integer(1500));
        fields.insert("ifInOctets".into(), FieldValue::Integer(in_octets));

        let mut interfaces = InterfaceMap::new();
        interfaces.insert("eth0".into(), fields);
        interfaces
    }

    #[test]
    fn test_compute_rate() {
        let a = RateSample { timestamp: 100.0, value: 5000 };
        let b = RateSample { timestamp: 110.0, value: 6000 };

        assert_eq!(compute_rate(&a, &b), Rate::Known(100.0));
        assert_eq!(compute_rate(&b, &a), Rate::Unknown);
        // no elapsed time
        assert_eq!(compute_rate(&a, &a), Rate::Unknown);
    }

    #[test]
    fn test_first_poll_only_seeds_cache() {
        let mut deriver = MetricDeriver::new(PREFIX);
        let snapshots = deriver.derive(&eth0(5000), 100.0);

        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].item("if_in_octets_ps").is_none());
        assert_eq!(
            deriver.rate_cache()[&("eth0".to_string(), "ifInOctets".to_string())],
            RateSample { timestamp: 100.0, value: 5000 }
        );
    }

    #[test]
    fn test_rate_over_two_polls() {
        let mut deriver = MetricDeriver::new(PREFIX);
        deriver.derive(&eth0(5000), 100.0);
        let snapshots = deriver.derive(&eth0(6000), 110.0);

        let rate = snapshots[0].item("if_in_octets_ps").unwrap();
        assert_eq!(rate.value, MetricValue::Float(100.0));
        assert_eq!(rate.unit.as_deref(), Some("bytes/s"));
    }

    #[test]
    fn test_counter_reset_gives_unknown_rate() {
        let mut deriver = MetricDeriver::new(PREFIX);
        deriver.derive(&eth0(5000), 100.0);
        deriver.derive(&eth0(6000), 110.0);
        let snapshots = deriver.derive(&eth0(10), 120.0);

        let rate = snapshots[0].item("if_in_octets_ps").unwrap();
        assert_eq!(rate.value, MetricValue::Unknown);
        assert_eq!(rate.unit.as_deref(), Some("bytes/s"));

        // the reset value seeds the next rate
        let snapshots = deriver.derive(&eth0(1010), 130.0);
        assert_eq!(
            snapshots[0].item("if_in_octets_ps").unwrap().value,
            MetricValue::Float(100.0)
        );
    }

    #[test]
    fn test_stalled_clock_gives_unknown_rate() {
        let mut deriver = MetricDeriver::new(PREFIX);
        deriver.derive(&eth0(5000), 100.0);
        let snapshots = deriver.derive(&eth0(6000), 100.0);

        assert!(snapshots[0].item("if_in_octets_ps").unwrap().value.is_unknown());
    }

    #[test]
    fn test_vanished_interfaces_leave_cache() {
        let mut deriver = MetricDeriver::new(PREFIX);
        deriver.derive(&eth0(5000), 100.0);
        assert_eq!(deriver.rate_cache().len(), 1);

        deriver.derive(&InterfaceMap::new(), 110.0);
        assert!(deriver.rate_cache().is_empty());
    }

    #[test]
    fn test_field_selection_and_units() {
        let mut deriver = MetricDeriver::new(PREFIX);
        let mut interfaces = eth0(5000);
        let fields = interfaces.get_mut("eth0").unwrap();
        fields.insert("ifSpeed".into(), FieldValue::Integer(0));
        fields.insert("ifLastChange".into(), FieldValue::Text("0".into()));
        fields.insert("adslAtucCurrAtn".into(), FieldValue::Integer(215));

        let snapshot = deriver.derive(&interfaces, 100.0).remove(0);
        let names: Vec<_> = snapshot.items.iter().map(|i| i.name.as_str()).collect();

        for hidden in ["if_index", "if_type", "if_speed", "if_last_change"] {
            assert!(!names.contains(&hidden), "{hidden} should be hidden");
        }
        assert_eq!(snapshot.item("if_mtu").unwrap().unit.as_deref(), Some("bytes"));
        assert_eq!(snapshot.item("if_descr").unwrap().unit, None);

        let atn = snapshot.item("adsl_atuc_curr_atn").unwrap();
        assert_eq!(atn.value, MetricValue::Float(21.5));
        assert_eq!(atn.unit.as_deref(), Some("dB"));
    }

    #[test]
    fn test_identity() {
        let mut deriver = MetricDeriver::new(PREFIX);
        let first = deriver.derive(&eth0(5000), 100.0);
        let second = deriver.derive(&eth0(9000), 110.0);

        assert_eq!(first[0].unique_id, format!("{PREFIX}-001122334455"));
        assert_eq!(first[0].unique_id, second[0].unique_id);

        let mut no_mac = eth0(5000);
        no_mac
            .get_mut("eth0")
            .unwrap()
            .insert("ifPhysAddress".into(), FieldValue::Text(String::new()));
        let snapshot = deriver.derive(&no_mac, 120.0).remove(0);
        assert_eq!(snapshot.unique_id, format!("{PREFIX}-_eth0"));
        // an empty hardware address is also hidden
        assert!(snapshot.item("if_phys_address").is_none());
    }
}
