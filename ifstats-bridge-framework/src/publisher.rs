//! Broker publishing capability and its MQTT implementation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Outgoing, Packet, QoS};
use tokio::task::JoinHandle;

use crate::MqttConfig;
use crate::availability::{PAYLOAD_OFFLINE, PAYLOAD_ONLINE};
use crate::error::{BridgeError, Result};

/// Capacity of the client request channel.
///
/// Publishes fail once this many requests wait for a broker connection.
const REQUEST_CHANNEL_CAPACITY: usize = 100;

/// Something that can publish a payload to a broker topic.
///
/// Failures are returned to the caller; implementations do not retry.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Publish `payload` on `topic`, optionally retained.
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<()>;
}

/// Publisher backed by a rumqttc client.
///
/// Cloning is cheap; all clones share one connection.
#[derive(Clone, Debug)]
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
}

impl MqttPublisher {
    /// Create a client for the broker in `config`.
    ///
    /// The broker is told to publish "offline" (retained) on
    /// `availability_topic` if the connection drops without a disconnect.
    /// The returned event loop must be driven, see [`spawn_event_loop`].
    pub fn connect(
        config: &MqttConfig,
        client_id: &str,
        availability_topic: &str,
    ) -> Result<(Self, EventLoop)> {
        if config.host.is_empty() {
            return Err(BridgeError::MqttConnection(
                "broker host cannot be empty".to_string(),
            ));
        }

        let mut options = MqttOptions::new(client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        options.set_last_will(LastWill::new(
            availability_topic,
            PAYLOAD_OFFLINE,
            QoS::AtMostOnce,
            true,
        ));

        if let Some((username, password)) = config.credentials() {
            options.set_credentials(username, password);
        }

        tracing::info!(
            broker = %config.broker_addr(),
            client_id = %client_id,
            "Connecting to MQTT broker"
        );

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        Ok((
            Self {
                client,
                qos: QoS::AtMostOnce,
            },
            event_loop,
        ))
    }

    /// Ask the broker to close the connection cleanly.
    ///
    /// Fails instead of waiting when the request channel is full.
    pub fn disconnect(&self) -> Result<()> {
        self.client
            .try_disconnect()
            .map_err(|e| BridgeError::MqttConnection(e.to_string()))
    }
}

#[async_trait]
impl MessageSink for MqttPublisher {
    /// Queue the message without waiting.
    ///
    /// While the broker is unreachable the request channel fills up and
    /// publishes fail with [`BridgeError::Publish`].
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<()> {
        self.client
            .try_publish(topic, self.qos, retain, payload)
            .map_err(|e| BridgeError::publish(topic, e))?;

        tracing::trace!(topic = %topic, retain, "Published message");
        Ok(())
    }
}

/// Drive a rumqttc event loop until the client disconnects.
///
/// Connection errors are logged and retried after a second; rumqttc
/// reconnects on the next poll. After every reconnect the collector is
/// announced "online" again, since the broker will have published the last
/// will in the meantime.
pub fn spawn_event_loop(
    mut event_loop: EventLoop,
    client: MqttPublisher,
    availability_topic: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut connections = 0u64;

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connections += 1;
                    tracing::info!(connections, "Connected to MQTT broker");

                    if connections > 1
                        && let Err(e) = client.client.try_publish(
                            availability_topic.as_str(),
                            QoS::AtMostOnce,
                            true,
                            PAYLOAD_ONLINE,
                        )
                    {
                        tracing::warn!(error = %e, "Failed to re-announce availability");
                    }
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    tracing::debug!("MQTT client disconnected");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "MQTT connection error, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    })
}

/// A message captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

impl PublishedMessage {
    /// Payload as text (lossy).
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// In-memory sink that records every message.
///
/// Used in tests. Can be told to fail, to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<PublishedMessage>>>,
    failing: Arc<Mutex<bool>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    /// All messages recorded so far.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages recorded on topics ending with `suffix`.
    pub fn messages_ending_with(&self, suffix: &str) -> Vec<PublishedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.topic.ends_with(suffix))
            .collect()
    }

    /// Forget recorded messages.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<()> {
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(BridgeError::publish(topic, "sink is failing"));
        }

        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedMessage {
                topic: topic.to_string(),
                payload,
                retain,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_records() {
        let sink = MemorySink::new();
        sink.publish("a/config", b"{}".to_vec(), true).await.unwrap();
        sink.publish("a/state", b"42".to_vec(), false).await.unwrap();

        assert_eq!(sink.messages().len(), 2);
        assert_eq!(sink.messages_ending_with("/state")[0].payload_str(), "42");
        assert!(sink.messages_ending_with("/config")[0].retain);

        sink.clear();
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_memory_sink_failure() {
        let sink = MemorySink::new();
        sink.set_failing(true);

        let err = sink.publish("a/state", b"1".to_vec(), false).await;
        assert!(matches!(err, Err(BridgeError::Publish { .. })));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_publish_fails_when_broker_unreachable() {
        let config = MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..MqttConfig::default()
        };
        let (client, event_loop) =
            MqttPublisher::connect(&config, "test", "homeassistant/_meta/x/status").unwrap();
        let _event_loop = spawn_event_loop(
            event_loop,
            client.clone(),
            "homeassistant/_meta/x/status".to_string(),
        );

        let result = tokio::time::timeout(Duration::from_secs(5), async {
            for i in 0..=REQUEST_CHANNEL_CAPACITY * 3 {
                client
                    .publish(&format!("a/{i}/state"), b"1".to_vec(), false)
                    .await?;
            }
            Ok::<_, BridgeError>(())
        })
        .await
        .expect("publish must not block");

        assert!(matches!(result, Err(BridgeError::Publish { .. })));
        assert!(client.disconnect().is_err());
    }

    #[test]
    fn test_connect_rejects_empty_host() {
        let config = MqttConfig {
            host: String::new(),
            ..MqttConfig::default()
        };
        let result = MqttPublisher::connect(&config, "test", "homeassistant/_meta/x/status");
        assert!(matches!(result, Err(BridgeError::MqttConnection(_))));
    }
}
