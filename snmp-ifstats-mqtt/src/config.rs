use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use ifstats_bridge_framework::{BridgeConfig, BridgeError, MqttConfig};
use ifstats_common::{DEFAULT_NAMESPACE, host_hash};

use crate::assembler::InterfaceFilter;

pub use ifstats_bridge_framework::LoggingConfig;

/// Root configuration of the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpIfstatsConfig {
    /// MQTT broker settings.
    #[serde(default)]
    pub mqtt: MqttConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// SNMP-specific settings.
    pub snmp: SnmpConfig,
}

/// SNMP-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpConfig {
    /// Sensor namespace in entity topics (default: "snmp_ifstats").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Seconds between two polling cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Seconds to wait for each SNMP response.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Default community string.
    #[serde(default = "default_community")]
    pub community: String,

    /// Default SNMP version.
    #[serde(default)]
    pub version: SnmpVersion,

    /// Interface names to poll; empty means all.
    #[serde(default)]
    pub include: Vec<String>,

    /// Interface names to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extra column OID to field name mappings.
    #[serde(default)]
    pub column_names: HashMap<String, String>,

    /// Devices to poll.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    5
}

fn default_community() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    161
}

/// SNMP protocol version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpVersion {
    #[serde(rename = "v1")]
    V1,
    #[default]
    #[serde(rename = "v2c")]
    V2c,
}

/// Configuration for a single SNMP device.
///
/// Unset options fall back to the global values of [`SnmpConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Host name or address; also the identity of the device.
    pub host: String,

    /// Agent UDP port.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub community: Option<String>,

    #[serde(default)]
    pub version: Option<SnmpVersion>,

    #[serde(default)]
    pub include: Option<Vec<String>>,

    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

/// Device settings after applying global defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub version: SnmpVersion,
    pub filter: InterfaceFilter,
}

impl ResolvedDevice {
    /// Agent address as `host:port`, bracketing IPv6 literals.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl SnmpConfig {
    /// Every device with the global defaults applied.
    pub fn resolve_devices(&self) -> Vec<ResolvedDevice> {
        self.devices
            .iter()
            .map(|device| ResolvedDevice {
                host: device.host.clone(),
                port: device.port,
                community: device
                    .community
                    .clone()
                    .unwrap_or_else(|| self.community.clone()),
                version: device.version.unwrap_or(self.version),
                filter: InterfaceFilter::new(
                    device.include.clone().unwrap_or_else(|| self.include.clone()),
                    device.exclude.clone().unwrap_or_else(|| self.exclude.clone()),
                ),
            })
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl BridgeConfig for SnmpIfstatsConfig {
    fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn namespace(&self) -> &str {
        &self.snmp.namespace
    }

    fn device_hashes(&self) -> Vec<String> {
        self.snmp.devices.iter().map(|d| host_hash(&d.host)).collect()
    }

    fn validate(&self) -> ifstats_bridge_framework::Result<()> {
        if self.mqtt.host.is_empty() {
            return Err(BridgeError::validation("MQTT host cannot be empty"));
        }
        if self.mqtt.discovery_prefix.is_empty() {
            return Err(BridgeError::validation("Discovery prefix cannot be empty"));
        }
        if self.snmp.namespace.is_empty() {
            return Err(BridgeError::validation("Namespace cannot be empty"));
        }
        if self.snmp.poll_interval_secs == 0 {
            return Err(BridgeError::validation(
                "poll_interval_secs must be greater than zero",
            ));
        }
        if self.snmp.devices.is_empty() {
            return Err(BridgeError::validation("At least one device is required"));
        }
        for (i, device) in self.snmp.devices.iter().enumerate() {
            if device.host.is_empty() {
                return Err(BridgeError::validation(format!(
                    "Device #{} has no host",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}
