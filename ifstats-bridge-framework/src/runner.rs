//! Bridge runner for lifecycle management.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};

use ifstats_common::{LoggingConfig, init_tracing};

use crate::BridgeArgs;
use crate::availability::Availability;
use crate::config::BridgeConfig;
use crate::discovery::DiscoveryPublisher;
use crate::error::{BridgeError, Result};
use crate::publisher::{MessageSink, MqttPublisher, spawn_event_loop};

/// How long shutdown waits for the event loop to flush the disconnect.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A source of device snapshots polled once per cycle.
#[async_trait]
pub trait SnapshotSource: Send {
    /// Error returned by a failed poll.
    type Error: Display + Send;

    /// Name used in logs.
    fn name(&self) -> &str;

    /// Poll once and queue the resulting snapshots on `publisher`.
    ///
    /// Returns the number of snapshots queued.
    async fn poll_into<S: MessageSink>(
        &mut self,
        publisher: &mut DiscoveryPublisher<S>,
    ) -> std::result::Result<usize, Self::Error>;
}

/// Run one poll-all-then-publish-all cycle.
///
/// A failing source is logged and skipped so the others still publish.
/// Publish failures are returned.
pub async fn run_cycle<T, S>(
    sources: &mut [T],
    publisher: &mut DiscoveryPublisher<S>,
) -> Result<usize>
where
    T: SnapshotSource,
    S: MessageSink,
{
    let mut failed = 0;

    for source in sources.iter_mut() {
        match source.poll_into(publisher).await {
            Ok(count) => {
                tracing::debug!(device = %source.name(), snapshots = count, "Polled device");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(device = %source.name(), error = %e, "Device poll failed");
            }
        }
    }

    let stats = publisher.publish().await?;

    tracing::debug!(
        devices = sources.len(),
        failed,
        messages = stats.total(),
        "Cycle complete"
    );

    Ok(stats.total())
}

/// Bridge runner that manages the lifecycle of the collector.
///
/// Handles:
/// - Logging initialization
/// - MQTT connection with an "offline" last will
/// - "online" announcement on the shared availability topic
/// - The fixed-interval poll/publish cycle
/// - Graceful shutdown on Ctrl+C
///
/// # Example
///
/// ```ignore
/// use ifstats_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = BridgeArgs::parse_with_default("mybridge.json5");
///     let config = MyBridgeConfig::load(&args.config)?;
///
///     let runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
///     let sources = build_sources(runner.config());
///
///     runner.run(sources, Duration::from_secs(10)).await
/// }
/// ```
pub struct BridgeRunner<C: BridgeConfig> {
    /// Bridge name for logging.
    name: String,
    /// The loaded configuration.
    config: C,
    /// Availability topic of this instance.
    availability: Availability,
    /// MQTT client handle.
    client: MqttPublisher,
    /// Discovery-aware publisher.
    publisher: DiscoveryPublisher<MqttPublisher>,
    /// Task driving the MQTT event loop.
    event_loop: JoinHandle<()>,
}

impl<C: BridgeConfig> BridgeRunner<C> {
    /// Create a new bridge runner with CLI args for log level override.
    ///
    /// This will:
    /// 1. Initialize logging based on config (with optional CLI override)
    /// 2. Connect to the broker with a last will on the availability topic
    /// 3. Announce the collector "online"
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&BridgeArgs>,
    ) -> Result<Self> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION");

        let mut log_config: LoggingConfig = config.logging().clone();
        if let Some(level) = args.and_then(|a| a.log_level.clone()) {
            log_config.level = level;
        }

        init_tracing(&log_config).map_err(|e| BridgeError::config(e.to_string()))?;

        tracing::info!(bridge = %name, version = %version, "Starting bridge");

        let topics = config.topics()?;
        let instance_id = config.instance_id();
        let availability = Availability::new(topics.availability_topic(&instance_id));
        let client_id = config
            .mqtt()
            .client_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", name, instance_id));

        let (client, event_loop) =
            MqttPublisher::connect(config.mqtt(), &client_id, availability.topic())?;
        let event_loop = spawn_event_loop(
            event_loop,
            client.clone(),
            availability.topic().to_string(),
        );

        availability.announce_online(&client).await?;

        let publisher = DiscoveryPublisher::new(client.clone(), topics, availability.topic());

        Ok(Self {
            name,
            config,
            availability,
            client,
            publisher,
            event_loop,
        })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get the availability topic.
    pub fn availability_topic(&self) -> &str {
        self.availability.topic()
    }

    /// Run poll/publish cycles every `period` until Ctrl+C is received.
    ///
    /// Ctrl+C also interrupts a cycle in progress.
    pub async fn run<T: SnapshotSource>(
        mut self,
        mut sources: Vec<T>,
        period: Duration,
    ) -> Result<()> {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        tracing::info!(
            bridge = %self.name,
            devices = sources.len(),
            period_secs = period.as_secs(),
            "Bridge running. Press Ctrl+C to stop."
        );

        loop {
            let cycle = async {
                ticker.tick().await;
                run_cycle(&mut sources, &mut self.publisher).await
            };

            tokio::select! {
                result = cycle => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "Publishing cycle failed");
                    }
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    }
                    break;
                }
            }
        }

        tracing::info!(bridge = %self.name, "Received shutdown signal");

        self.shutdown().await;
        Ok(())
    }

    /// Run a single poll/publish cycle, then shut down.
    pub async fn run_once<T: SnapshotSource>(mut self, mut sources: Vec<T>) -> Result<()> {
        let result = run_cycle(&mut sources, &mut self.publisher).await;
        if let Ok(sent) = &result {
            tracing::info!(bridge = %self.name, messages = *sent, "Single cycle complete");
        }

        self.shutdown().await;
        result.map(|_| ())
    }

    /// Announce "offline", disconnect, and wait briefly for the event loop
    /// to flush.
    async fn shutdown(mut self) {
        if let Err(e) = self.availability.announce_offline(&self.client).await {
            tracing::warn!(error = %e, "Failed to publish offline status");
        }

        if let Err(e) = self.client.disconnect() {
            tracing::warn!(error = %e, "Error disconnecting from MQTT broker");
        }

        if timeout(SHUTDOWN_GRACE, &mut self.event_loop).await.is_err() {
            self.event_loop.abort();
        }

        tracing::info!(bridge = %self.name, "Goodbye!");
    }
}
