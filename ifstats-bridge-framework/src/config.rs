//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use ifstats_common::{TopicBuilder, instance_id};

use crate::error::{BridgeError, Result};
use crate::{LoggingConfig, MqttConfig};

/// Trait for bridge configuration types.
///
/// Implement this trait for your bridge's configuration struct to get
/// automatic loading, validation, and the derived broker identity.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use ifstats_bridge_framework::{BridgeConfig, MqttConfig, LoggingConfig};
///
/// #[derive(Debug, Deserialize)]
/// pub struct MyBridgeConfig {
///     pub mqtt: MqttConfig,
///     pub logging: LoggingConfig,
///     pub hosts: Vec<String>,
/// }
///
/// impl BridgeConfig for MyBridgeConfig {
///     fn mqtt(&self) -> &MqttConfig {
///         &self.mqtt
///     }
///
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
///
///     fn namespace(&self) -> &str {
///         "my_bridge"
///     }
///
///     fn device_hashes(&self) -> Vec<String> {
///         self.hosts.iter().map(|h| ifstats_common::host_hash(h)).collect()
///     }
/// }
/// ```
pub trait BridgeConfig: Sized + DeserializeOwned {
    /// Get the MQTT configuration.
    fn mqtt(&self) -> &MqttConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Sensor namespace used in entity topics.
    fn namespace(&self) -> &str;

    /// Identity hashes of every configured device.
    fn device_hashes(&self) -> Vec<String>;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. Override to add custom validation.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Identifier of this collector instance, stable for a given fleet.
    fn instance_id(&self) -> String {
        let hashes = self.device_hashes();
        instance_id(hashes.iter().map(String::as_str))
    }

    /// Topic builder for the configured prefix and namespace.
    fn topics(&self) -> Result<TopicBuilder> {
        Ok(TopicBuilder::new(
            &self.mqtt().discovery_prefix,
            self.namespace(),
        )?)
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }
}
