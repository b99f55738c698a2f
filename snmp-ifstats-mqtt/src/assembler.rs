//! Grouping of walked column values into per-interface records.

use std::collections::{BTreeMap, HashMap};

use crate::codec::{FieldValue, cast_value};
use crate::error::Result;

/// Column that names an interface.
pub const NAME_FIELD: &str = "ifDescr";

/// SNMP type tag of a walked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawType {
    OctetString,
    Integer,
    Counter32,
    Counter64,
    Gauge32,
    TimeTicks,
    IpAddress,
    ObjectIdentifier,
    Other,
}

/// One walked column value of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    /// Row index, the interface index for every built-in table.
    pub index: String,
    /// Column name, e.g. "ifInOctets".
    pub field: String,
    /// Raw octets (numbers are rendered as decimal text).
    pub value: Vec<u8>,
    pub raw_type: RawType,
}

impl RawSample {
    pub fn new(
        index: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Vec<u8>>,
        raw_type: RawType,
    ) -> Self {
        Self {
            index: index.into(),
            field: field.into(),
            value: value.into(),
            raw_type,
        }
    }
}

/// Typed fields of one interface.
pub type TypedFieldSet = BTreeMap<String, FieldValue>;

/// Typed fields keyed by interface name.
pub type InterfaceMap = BTreeMap<String, TypedFieldSet>;

/// Include/exclude filter on interface names.
///
/// An empty include list admits every name. Exclude always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl InterfaceFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether an interface with this name is kept.
    pub fn admits(&self, name: &str) -> bool {
        if self.exclude.iter().any(|n| n == name) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|n| n == name)
    }
}

/// All samples of one interface index.
#[derive(Debug, Clone, Default)]
pub struct InterfaceRecord {
    pub index: String,
    pub fields: HashMap<String, RawSample>,
}

impl InterfaceRecord {
    /// The interface name, if the record carries a usable one.
    ///
    /// The name column must be an octet string that is non-empty once NUL
    /// padding is removed.
    pub fn name(&self) -> Option<String> {
        let sample = self.fields.get(NAME_FIELD)?;
        if sample.raw_type != RawType::OctetString {
            return None;
        }
        let name = String::from_utf8_lossy(&sample.value)
            .trim_end_matches('\0')
            .to_string();
        (!name.is_empty()).then_some(name)
    }

    /// Cast every sample of the record.
    pub fn typed_fields(&self) -> Result<TypedFieldSet> {
        self.fields
            .iter()
            .map(|(field, sample)| Ok((field.clone(), cast_value(field, &sample.value)?)))
            .collect()
    }
}

/// Builds per-interface records from one poll's samples.
#[derive(Debug, Clone, Default)]
pub struct DeviceRecordAssembler {
    filter: InterfaceFilter,
}

impl DeviceRecordAssembler {
    pub fn new(filter: InterfaceFilter) -> Self {
        Self { filter }
    }

    /// Group samples by interface index, preserving first-seen order.
    pub fn group(samples: impl IntoIterator<Item = RawSample>) -> Vec<InterfaceRecord> {
        let mut records: Vec<InterfaceRecord> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for sample in samples {
            let position = *positions.entry(sample.index.clone()).or_insert_with(|| {
                records.push(InterfaceRecord {
                    index: sample.index.clone(),
                    fields: HashMap::new(),
                });
                records.len() - 1
            });
            records[position]
                .fields
                .insert(sample.field.clone(), sample);
        }

        records
    }

    /// Assemble the typed field sets of every admitted interface.
    ///
    /// Records without a usable name or rejected by the filter are dropped.
    /// When two records share a name the later one in walk order wins.
    pub fn assemble(&self, samples: impl IntoIterator<Item = RawSample>) -> Result<InterfaceMap> {
        let mut interfaces = InterfaceMap::new();

        for record in Self::group(samples) {
            let Some(name) = record.name() else {
                tracing::trace!(index = %record.index, "Skipping interface without name");
                continue;
            };

            if !self.filter.admits(&name) {
                tracing::trace!(interface = %name, "Interface filtered out");
                continue;
            }

            let fields = record.typed_fields()?;
            if interfaces.insert(name.clone(), fields).is_some() {
                tracing::warn!(
                    interface = %name,
                    index = %record.index,
                    "Duplicate interface name, keeping the last one"
                );
            }
        }

        Ok(interfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PollError;

    fn interface(index: &str, name: &str, mac: &[u8]) -> Vec<RawSample> {
        vec![
            RawSample::new(index, "ifIndex", index.as_bytes(), RawType::Integer),
            RawSample::new(index, "ifDescr", name.as_bytes(), RawType::OctetString),
            RawSample::new(index, "ifPhysAddress", mac, RawType::OctetString),
            RawSample::new(index, "ifInOctets", b"1000".to_vec(), RawType::Counter32),
        ]
    }

    fn samples() -> Vec<RawSample> {
        let mut samples = interface("1", "eth0", &[0, 0x11, 0x22, 0x33, 0x44, 0x55]);
        samples.extend(interface("2", "eth1", &[0, 0x11, 0x22, 0x33, 0x44, 0x56]));
        samples.extend(interface("3", "lo", &[]));
        samples
    }

    #[test]
    fn test_filter_rules() {
        let exclude_only = InterfaceFilter::new(vec![], vec!["eth0".into()]);
        assert!(!exclude_only.admits("eth0"));
        assert!(exclude_only.admits("eth1"));

        let include_only = InterfaceFilter::new(vec!["eth0".into()], vec!["eth1".into()]);
        assert!(include_only.admits("eth0"));
        assert!(!include_only.admits("eth1"));
        assert!(!include_only.admits("lo"));

        let both = InterfaceFilter::new(vec!["eth0".into()], vec!["eth0".into()]);
        assert!(!both.admits("eth0"));
    }

    #[test]
    fn test_assemble_excluded_interface() {
        let assembler = DeviceRecordAssembler::new(InterfaceFilter::new(vec![], vec!["eth0".into()]));
        let interfaces = assembler.assemble(samples()).unwrap();

        assert_eq!(interfaces.keys().collect::<Vec<_>>(), ["eth1", "lo"]);
    }

    #[test]
    fn test_assemble_included_interface() {
        let assembler = DeviceRecordAssembler::new(InterfaceFilter::new(
            vec!["eth0".into()],
            vec!["eth1".into()],
        ));
        let interfaces = assembler.assemble(samples()).unwrap();

        assert_eq!(interfaces.keys().collect::<Vec<_>>(), ["eth0"]);
        let eth0 = &interfaces["eth0"];
        assert_eq!(eth0["ifPhysAddress"], FieldValue::Text("001122334455".into()));
        assert_eq!(eth0["ifInOctets"], FieldValue::Integer(1000));
    }

    #[test]
    fn test_adsl_columns_join_interface() {
        let mut samples = interface("4", "dsl0", &[]);
        samples.push(RawSample::new("4", "adslAtucCurrAtn", b"215".to_vec(), RawType::Gauge32));

        let interfaces = DeviceRecordAssembler::default().assemble(samples).unwrap();
        assert_eq!(interfaces["dsl0"]["adslAtucCurrAtn"], FieldValue::Integer(215));
    }

    #[test]
    fn test_records_without_usable_name_dropped() {
        let samples = vec![
            // no name column
            RawSample::new("1", "ifMtu", b"1500".to_vec(), RawType::Integer),
            // wrong type
            RawSample::new("2", "ifDescr", b"42".to_vec(), RawType::Integer),
            // only padding
            RawSample::new("3", "ifDescr", b"\0\0".to_vec(), RawType::OctetString),
            RawSample::new("4", "ifDescr", b"ppp0\0".to_vec(), RawType::OctetString),
        ];

        let interfaces = DeviceRecordAssembler::default().assemble(samples).unwrap();
        assert_eq!(interfaces.keys().collect::<Vec<_>>(), ["ppp0"]);
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let mut samples = interface("1", "eth0", &[1, 2, 3, 4, 5, 6]);
        samples.extend(interface("7", "eth0", &[6, 5, 4, 3, 2, 1]));

        let interfaces = DeviceRecordAssembler::default().assemble(samples).unwrap();
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces["eth0"]["ifIndex"], FieldValue::Integer(7));
    }

    #[test]
    fn test_malformed_value_propagates() {
        let mut samples = interface("1", "eth0", &[]);
        samples.push(RawSample::new("1", "ifOutOctets", b"n/a".to_vec(), RawType::OctetString));

        let err = DeviceRecordAssembler::default().assemble(samples).unwrap_err();
        assert!(matches!(err, PollError::MalformedValue { ref field, .. } if field == "ifOutOctets"));
    }

    #[test]
    fn test_group_keeps_walk_order() {
        let records = DeviceRecordAssembler::group(samples());
        let indexes: Vec<_> = records.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(indexes, ["1", "2", "3"]);
        assert_eq!(records[0].fields.len(), 4);
    }
}
