//! Interface statistics bridge framework
//!
//! Common abstractions for bridges that publish device metrics to an MQTT
//! broker using the home-automation discovery convention.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading, validation and the derived instance identity
//! - [`BridgeRunner`] for managing bridge lifecycle (connect, availability, poll cycles, shutdown)
//! - [`DiscoveryPublisher`] for publishing snapshots with change-aware discovery payloads
//! - [`MessageSink`] as the publish capability, with [`MqttPublisher`] and [`MemorySink`]
//! - [`BridgeArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use ifstats_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = BridgeArgs::parse_with_default("mybridge.json5");
//!     let config = MyBridgeConfig::load(&args.config)?;
//!
//!     let runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
//!     let sources = my_sources(runner.config());
//!
//!     // Run until Ctrl+C
//!     runner.run(sources, std::time::Duration::from_secs(10)).await
//! }
//! ```

mod args;
mod availability;
mod config;
mod discovery;
mod error;
mod publisher;
mod runner;

pub use args::BridgeArgs;
pub use availability::{Availability, PAYLOAD_OFFLINE, PAYLOAD_ONLINE};
pub use config::BridgeConfig;
pub use discovery::{
    AvailabilityEntry, DiscoveryDevice, DiscoveryPayload, DiscoveryPublisher, PublishStats,
};
pub use error::{BridgeError, Result};
pub use publisher::{MemorySink, MessageSink, MqttPublisher, PublishedMessage, spawn_event_loop};
pub use runner::{BridgeRunner, SnapshotSource, run_cycle};

// Re-export commonly used types from ifstats-common
pub use ifstats_common::{
    DataItem, DeviceSnapshot, LoggingConfig, MetricValue, MqttConfig, TopicBuilder,
};
