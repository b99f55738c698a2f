//! Interface statistics common library
//!
//! This crate provides shared types and utilities for the SNMP interface
//! statistics bridge:
//!
//! - [`telemetry`] - Published data model (`DeviceSnapshot`, `DataItem`, `MetricValue`)
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`topic`] - Broker topic builders for discovery, state and availability
//! - [`identity`] - Stable device and instance identifiers
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod identity;
pub mod telemetry;
pub mod topic;

// Re-export commonly used types at the crate root
pub use config::{BaseConfig, LogFormat, LoggingConfig, MqttConfig, parse_config};
pub use error::{Error, Result};
pub use identity::{host_hash, instance_id};
pub use telemetry::{DataItem, DeviceSnapshot, MetricValue, current_timestamp_secs};
pub use topic::{DEFAULT_NAMESPACE, DISCOVERY_PREFIX, TopicBuilder, config_topic, state_topic};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// # Example
///
/// ```ignore
/// use ifstats_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
