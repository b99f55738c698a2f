//! Column resolution for the walked MIB tables.
//!
//! A table walk returns numeric OIDs of the form `<column OID>.<index>`.
//! The resolver maps the column part to its MIB object name (e.g.
//! `ifInOctets`) and returns the remaining suffix as the row index, which for
//! every built-in table is the interface index.
//!
//! # Example
//!
//! ```
//! use snmp_ifstats_mqtt::mib::ColumnResolver;
//!
//! let resolver = ColumnResolver::builtin();
//! let (field, index) = resolver.resolve("1.3.6.1.2.1.2.2.1.10.3").unwrap();
//! assert_eq!(field, "ifInOctets");
//! assert_eq!(index, "3");
//! ```

use std::collections::HashMap;

/// A MIB table whose rows are indexed by interface.
#[derive(Debug, Clone, Copy)]
pub struct ColumnTable {
    /// MIB module (e.g. "IF-MIB").
    pub module: &'static str,
    /// OID of the table entry; columns are `<entry>.<n>`.
    pub entry: &'static str,
    /// Column number and object name.
    pub columns: &'static [(u32, &'static str)],
}

/// IF-MIB ifEntry.
pub const IF_TABLE: ColumnTable = ColumnTable {
    module: "IF-MIB",
    entry: "1.3.6.1.2.1.2.2.1",
    columns: &[
        (1, "ifIndex"),
        (2, "ifDescr"),
        (3, "ifType"),
        (4, "ifMtu"),
        (5, "ifSpeed"),
        (6, "ifPhysAddress"),
        (7, "ifAdminStatus"),
        (8, "ifOperStatus"),
        (9, "ifLastChange"),
        (10, "ifInOctets"),
        (11, "ifInUcastPkts"),
        (12, "ifInNUcastPkts"),
        (13, "ifInDiscards"),
        (14, "ifInErrors"),
        (15, "ifInUnknownProtos"),
        (16, "ifOutOctets"),
        (17, "ifOutUcastPkts"),
        (18, "ifOutNUcastPkts"),
        (19, "ifOutDiscards"),
        (20, "ifOutErrors"),
        (21, "ifOutQLen"),
        (22, "ifSpecific"),
    ],
};

/// ADSL-LINE-MIB adslLineEntry.
pub const ADSL_LINE_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.1.1",
    columns: &[
        (1, "adslLineCoding"),
        (2, "adslLineType"),
        (3, "adslLineSpecific"),
        (4, "adslLineConfProfile"),
        (5, "adslLineAlarmConfProfile"),
    ],
};

/// ADSL-LINE-MIB adslAtucPhysEntry (central office end).
pub const ADSL_ATUC_PHYS_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.2.1",
    columns: &[
        (1, "adslAtucInvSerialNumber"),
        (2, "adslAtucInvVendorID"),
        (3, "adslAtucInvVersionNumber"),
        (4, "adslAtucCurrSnrMgn"),
        (5, "adslAtucCurrAtn"),
        (6, "adslAtucCurrStatus"),
        (7, "adslAtucCurrOutputPwr"),
        (8, "adslAtucCurrAttainableRate"),
    ],
};

/// ADSL-LINE-MIB adslAturPhysEntry (remote end).
pub const ADSL_ATUR_PHYS_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.3.1",
    columns: &[
        (1, "adslAturInvSerialNumber"),
        (2, "adslAturInvVendorID"),
        (3, "adslAturInvVersionNumber"),
        (4, "adslAturCurrSnrMgn"),
        (5, "adslAturCurrAtn"),
        (6, "adslAturCurrStatus"),
        (7, "adslAturCurrOutputPwr"),
        (8, "adslAturCurrAttainableRate"),
    ],
};

/// ADSL-LINE-MIB adslAtucChanEntry.
pub const ADSL_ATUC_CHAN_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.4.1",
    columns: &[
        (1, "adslAtucChanInterleaveDelay"),
        (2, "adslAtucChanCurrTxRate"),
        (3, "adslAtucChanPrevTxRate"),
        (4, "adslAtucChanCrcBlockLength"),
    ],
};

/// ADSL-LINE-MIB adslAturChanEntry.
pub const ADSL_ATUR_CHAN_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.5.1",
    columns: &[
        (1, "adslAturChanInterleaveDelay"),
        (2, "adslAturChanCurrTxRate"),
        (3, "adslAturChanPrevTxRate"),
        (4, "adslAturChanCrcBlockLength"),
    ],
};

/// ADSL-LINE-MIB adslAtucPerfDataEntry.
pub const ADSL_ATUC_PERF_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.6.1",
    columns: &[
        (1, "adslAtucPerfLofs"),
        (2, "adslAtucPerfLoss"),
        (3, "adslAtucPerfLols"),
        (4, "adslAtucPerfLprs"),
        (5, "adslAtucPerfESs"),
        (6, "adslAtucPerfInits"),
        (7, "adslAtucPerfValidIntervals"),
        (8, "adslAtucPerfInvalidIntervals"),
        (9, "adslAtucPerfCurr15MinTimeElapsed"),
        (10, "adslAtucPerfCurr15MinLofs"),
        (11, "adslAtucPerfCurr15MinLoss"),
        (12, "adslAtucPerfCurr15MinLols"),
        (13, "adslAtucPerfCurr15MinLprs"),
        (14, "adslAtucPerfCurr15MinESs"),
        (15, "adslAtucPerfCurr15MinInits"),
        (16, "adslAtucPerfCurr1DayTimeElapsed"),
        (17, "adslAtucPerfCurr1DayLofs"),
        (18, "adslAtucPerfCurr1DayLoss"),
        (19, "adslAtucPerfCurr1DayLols"),
        (20, "adslAtucPerfCurr1DayLprs"),
        (21, "adslAtucPerfCurr1DayESs"),
        (22, "adslAtucPerfCurr1DayInits"),
        (23, "adslAtucPerfPrev1DayMoniSecs"),
        (24, "adslAtucPerfPrev1DayLofs"),
        (25, "adslAtucPerfPrev1DayLoss"),
        (26, "adslAtucPerfPrev1DayLols"),
        (27, "adslAtucPerfPrev1DayLprs"),
        (28, "adslAtucPerfPrev1DayESs"),
        (29, "adslAtucPerfPrev1DayInits"),
    ],
};

/// ADSL-LINE-MIB adslAturPerfDataEntry.
pub const ADSL_ATUR_PERF_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.7.1",
    columns: &[
        (1, "adslAturPerfLofs"),
        (2, "adslAturPerfLoss"),
        (3, "adslAturPerfLprs"),
        (4, "adslAturPerfESs"),
        (5, "adslAturPerfValidIntervals"),
        (6, "adslAturPerfInvalidIntervals"),
        (7, "adslAturPerfCurr15MinTimeElapsed"),
        (8, "adslAturPerfCurr15MinLofs"),
        (9, "adslAturPerfCurr15MinLoss"),
        (10, "adslAturPerfCurr15MinLprs"),
        (11, "adslAturPerfCurr15MinESs"),
        (12, "adslAturPerfCurr1DayTimeElapsed"),
        (13, "adslAturPerfCurr1DayLofs"),
        (14, "adslAturPerfCurr1DayLoss"),
        (15, "adslAturPerfCurr1DayLprs"),
        (16, "adslAturPerfCurr1DayESs"),
        (17, "adslAturPerfPrev1DayMoniSecs"),
        (18, "adslAturPerfPrev1DayLofs"),
        (19, "adslAturPerfPrev1DayLoss"),
        (20, "adslAturPerfPrev1DayLprs"),
        (21, "adslAturPerfPrev1DayESs"),
    ],
};

/// ADSL-LINE-MIB adslAtucChanPerfDataEntry.
pub const ADSL_ATUC_CHAN_PERF_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.10.1",
    columns: &[
        (1, "adslAtucChanReceivedBlks"),
        (2, "adslAtucChanTransmittedBlks"),
        (3, "adslAtucChanCorrectedBlks"),
        (4, "adslAtucChanUncorrectBlks"),
        (5, "adslAtucChanPerfValidIntervals"),
        (6, "adslAtucChanPerfInvalidIntervals"),
        (7, "adslAtucChanPerfCurr15MinTimeElapsed"),
        (8, "adslAtucChanPerfCurr15MinReceivedBlks"),
        (9, "adslAtucChanPerfCurr15MinTransmittedBlks"),
        (10, "adslAtucChanPerfCurr15MinCorrectedBlks"),
        (11, "adslAtucChanPerfCurr15MinUncorrectBlks"),
        (12, "adslAtucChanPerfCurr1DayTimeElapsed"),
        (13, "adslAtucChanPerfCurr1DayReceivedBlks"),
        (14, "adslAtucChanPerfCurr1DayTransmittedBlks"),
        (15, "adslAtucChanPerfCurr1DayCorrectedBlks"),
        (16, "adslAtucChanPerfCurr1DayUncorrectBlks"),
        (17, "adslAtucChanPerfPrev1DayMoniSecs"),
        (18, "adslAtucChanPerfPrev1DayReceivedBlks"),
        (19, "adslAtucChanPerfPrev1DayTransmittedBlks"),
        (20, "adslAtucChanPerfPrev1DayCorrectedBlks"),
        (21, "adslAtucChanPerfPrev1DayUncorrectBlks"),
    ],
};

/// ADSL-LINE-MIB adslAturChanPerfDataEntry.
pub const ADSL_ATUR_CHAN_PERF_TABLE: ColumnTable = ColumnTable {
    module: "ADSL-LINE-MIB",
    entry: "1.3.6.1.2.1.10.94.1.1.11.1",
    columns: &[
        (1, "adslAturChanReceivedBlks"),
        (2, "adslAturChanTransmittedBlks"),
        (3, "adslAturChanCorrectedBlks"),
        (4, "adslAturChanUncorrectBlks"),
        (5, "adslAturChanPerfValidIntervals"),
        (6, "adslAturChanPerfInvalidIntervals"),
        (7, "adslAturChanPerfCurr15MinTimeElapsed"),
        (8, "adslAturChanPerfCurr15MinReceivedBlks"),
        (9, "adslAturChanPerfCurr15MinTransmittedBlks"),
        (10, "adslAturChanPerfCurr15MinCorrectedBlks"),
        (11, "adslAturChanPerfCurr15MinUncorrectBlks"),
        (12, "adslAturChanPerfCurr1DayTimeElapsed"),
        (13, "adslAturChanPerfCurr1DayReceivedBlks"),
        (14, "adslAturChanPerfCurr1DayTransmittedBlks"),
        (15, "adslAturChanPerfCurr1DayCorrectedBlks"),
        (16, "adslAturChanPerfCurr1DayUncorrectBlks"),
        (17, "adslAturChanPerfPrev1DayMoniSecs"),
        (18, "adslAturChanPerfPrev1DayReceivedBlks"),
        (19, "adslAturChanPerfPrev1DayTransmittedBlks"),
        (20, "adslAturChanPerfPrev1DayCorrectedBlks"),
        (21, "adslAturChanPerfPrev1DayUncorrectBlks"),
    ],
};

/// Every built-in table.
pub const BUILTIN_TABLES: &[ColumnTable] = &[
    IF_TABLE,
    ADSL_LINE_TABLE,
    ADSL_ATUC_PHYS_TABLE,
    ADSL_ATUR_PHYS_TABLE,
    ADSL_ATUC_CHAN_TABLE,
    ADSL_ATUR_CHAN_TABLE,
    ADSL_ATUC_PERF_TABLE,
    ADSL_ATUR_PERF_TABLE,
    ADSL_ATUC_CHAN_PERF_TABLE,
    ADSL_ATUR_CHAN_PERF_TABLE,
];

/// Resolves walked OIDs to `(field name, row index)`.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    /// Column OID to field name.
    columns: HashMap<String, String>,
    /// Loaded MIB modules.
    loaded_modules: Vec<String>,
}

impl ColumnResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with all built-in tables loaded.
    pub fn builtin() -> Self {
        let mut resolver = Self::new();
        for table in BUILTIN_TABLES {
            resolver.load_table(table);
        }
        resolver
    }

    /// Load the columns of one table.
    pub fn load_table(&mut self, table: &ColumnTable) {
        for (column, name) in table.columns {
            self.columns
                .insert(format!("{}.{}", table.entry, column), name.to_string());
        }
        if !self.loaded_modules.iter().any(|m| m == table.module) {
            self.loaded_modules.push(table.module.to_string());
        }
    }

    /// Add column mappings from configuration, overriding built-ins.
    pub fn add_custom_mappings(&mut self, mappings: &HashMap<String, String>) {
        for (oid, name) in mappings {
            let oid = oid.trim_start_matches('.');
            self.columns.insert(oid.to_string(), name.clone());
        }
    }

    /// Resolve a walked OID into its column name and row index.
    ///
    /// Returns `None` for OIDs that do not belong to a known column or carry
    /// no index.
    pub fn resolve(&self, oid: &str) -> Option<(String, String)> {
        let oid = oid.trim_start_matches('.');

        // The longest matching column wins: walk split points right to left.
        let mut end = oid.len();
        while let Some(dot) = oid[..end].rfind('.') {
            if let Some(name) = self.columns.get(&oid[..dot]) {
                return Some((name.clone(), oid[dot + 1..].to_string()));
            }
            end = dot;
        }

        None
    }

    /// Get list of loaded MIB modules.
    pub fn loaded_modules(&self) -> &[String] {
        &self.loaded_modules
    }

    /// Get total number of known columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
