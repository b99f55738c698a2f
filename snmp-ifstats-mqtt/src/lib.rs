//! SNMP interface statistics to MQTT.
//!
//! Polls devices over SNMP for their IF-MIB interface table and ADSL line
//! tables, derives byte rates from the octet counters, and publishes every
//! value as a self-describing sensor entity.
//!
//! # Topics
//!
//! ```text
//! homeassistant/_meta/<instance id>/status                        online | offline
//! homeassistant/sensor/snmp_ifstats/<unique id>-<field>/config   discovery payload
//! homeassistant/sensor/snmp_ifstats/<unique id>-<field>/state    value
//! ```
//!
//! # Pipeline
//!
//! [`poller::PollingConnection`] walks the device, [`mib::ColumnResolver`]
//! names the columns, [`assembler::DeviceRecordAssembler`] groups and filters
//! interfaces, and [`deriver::MetricDeriver`] produces the snapshots handed
//! to the discovery publisher.

pub mod assembler;
pub mod codec;
pub mod config;
pub mod deriver;
pub mod error;
pub mod mib;
pub mod oid;
pub mod poller;
pub mod units;

pub use error::{PollError, Result};
