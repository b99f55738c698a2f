use snmp2::Oid;

use crate::error::{PollError, Result};

/// IF-MIB ifTable.
pub const IF_TABLE_ROOT: &str = "1.3.6.1.2.1.2.2.1";

/// ADSL-LINE-MIB adslMIB.
pub const ADSL_TABLE_ROOT: &str = "1.3.6.1.2.1.10.94";

/// Subtrees walked on every poll, in order.
pub const WALK_ROOTS: &[&str] = &[IF_TABLE_ROOT, ADSL_TABLE_ROOT];

/// Parse an OID string (e.g., "1.3.6.1.2.1.2.2.1") into an snmp2::Oid.
pub fn parse_oid(oid_str: &str) -> Result<Oid<'static>> {
    oid_str
        .trim_start_matches('.')
        .parse::<Oid>()
        .map_err(|e| PollError::InvalidOid(format!("{}: {:?}", oid_str, e)))
        .map(|oid| oid.to_owned())
}

/// Convert an snmp2::Oid back to a dotted string representation.
pub fn oid_to_string(oid: &Oid) -> String {
    oid.to_id_string()
}

/// Check if an OID is a child of (or equal to) a parent OID.
pub fn oid_starts_with(oid: &Oid, parent: &Oid) -> bool {
    oid.starts_with(parent)
}
