//! Discovery-aware publishing of device snapshots.
//!
//! Every [`DataItem`] becomes one sensor entity on the broker. The entity's
//! discovery payload is published (retained) the first time it is seen and
//! again whenever it changes; its state is published on every cycle.

use std::collections::HashMap;

use serde::Serialize;

use ifstats_common::{DataItem, DeviceSnapshot, TopicBuilder, config_topic, state_topic};

use crate::availability::{PAYLOAD_OFFLINE, PAYLOAD_ONLINE};
use crate::error::Result;
use crate::publisher::MessageSink;

/// Device block of a discovery payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryDevice {
    pub name: String,
    pub identifiers: String,
}

/// Availability block of a discovery payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityEntry {
    pub topic: String,
    pub payload_available: String,
    pub payload_not_available: String,
}

/// Discovery (config) payload of one sensor entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryPayload {
    /// Base topic; `~` in other fields expands to this.
    #[serde(rename = "~")]
    pub base_topic: String,
    pub device: DiscoveryDevice,
    pub name: String,
    pub unique_id: String,
    pub availability: Vec<AvailabilityEntry>,
    pub state_topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
}

/// Counts from one [`DiscoveryPublisher::publish`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    /// Discovery payloads sent (new or changed entities).
    pub discovery: usize,
    /// State values sent.
    pub state: usize,
}

impl PublishStats {
    /// Total number of messages sent.
    pub fn total(&self) -> usize {
        self.discovery + self.state
    }
}

/// Publishes queued snapshots, re-sending discovery payloads only on change.
///
/// Owns the record of what was last announced per entity for the lifetime of
/// the process. Entities that disappear are never retracted.
#[derive(Debug)]
pub struct DiscoveryPublisher<S> {
    sink: S,
    topics: TopicBuilder,
    availability_topic: String,
    queue: Vec<DeviceSnapshot>,
    announced: HashMap<String, DiscoveryPayload>,
}

impl<S: MessageSink> DiscoveryPublisher<S> {
    /// Create a publisher writing to `sink`.
    pub fn new(sink: S, topics: TopicBuilder, availability_topic: impl Into<String>) -> Self {
        Self {
            sink,
            topics,
            availability_topic: availability_topic.into(),
            queue: Vec::new(),
            announced: HashMap::new(),
        }
    }

    /// The underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The shared availability topic referenced by every entity.
    pub fn availability_topic(&self) -> &str {
        &self.availability_topic
    }

    /// Queue a snapshot for the next [`publish`](Self::publish).
    pub fn queue(&mut self, snapshot: DeviceSnapshot) {
        self.queue.push(snapshot);
    }

    /// Number of snapshots waiting to be published.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Number of entities announced so far.
    pub fn announced(&self) -> usize {
        self.announced.len()
    }

    /// Build the discovery payload of one item of a snapshot.
    pub fn discovery_payload(&self, snapshot: &DeviceSnapshot, item: &DataItem) -> DiscoveryPayload {
        DiscoveryPayload {
            base_topic: self.topics.entity_basename(&snapshot.unique_id, &item.name),
            device: DiscoveryDevice {
                name: snapshot.name.clone(),
                identifiers: snapshot.unique_id.clone(),
            },
            name: format!("{} {}", snapshot.name, item.name),
            unique_id: format!("{}-{}", snapshot.unique_id, item.name),
            availability: vec![AvailabilityEntry {
                topic: self.availability_topic.clone(),
                payload_available: PAYLOAD_ONLINE.to_string(),
                payload_not_available: PAYLOAD_OFFLINE.to_string(),
            }],
            state_topic: "~/state".to_string(),
            unit_of_measurement: item.unit.clone(),
        }
    }

    /// Publish every queued snapshot.
    ///
    /// The queue is drained even on failure: the next cycle queues fresh
    /// snapshots. A discovery payload that failed to send is not recorded, so
    /// it is sent again on the next cycle.
    pub async fn publish(&mut self) -> Result<PublishStats> {
        let queue = std::mem::take(&mut self.queue);
        let mut stats = PublishStats::default();

        for snapshot in &queue {
            for item in &snapshot.items {
                self.publish_item(snapshot, item, &mut stats).await?;
            }
        }

        tracing::debug!(
            snapshots = queue.len(),
            discovery = stats.discovery,
            state = stats.state,
            "Published queued snapshots"
        );

        Ok(stats)
    }

    async fn publish_item(
        &mut self,
        snapshot: &DeviceSnapshot,
        item: &DataItem,
        stats: &mut PublishStats,
    ) -> Result<()> {
        let payload = self.discovery_payload(snapshot, item);
        let basename = payload.base_topic.clone();

        if self.announced.get(&basename) != Some(&payload) {
            let body = serde_json::to_vec(&payload)?;
            self.sink.publish(&config_topic(&basename), body, true).await?;

            tracing::info!(
                device = %snapshot.name,
                entity = %payload.unique_id,
                unit = ?payload.unit_of_measurement,
                "Discovered entity"
            );

            self.announced.insert(basename.clone(), payload);
            stats.discovery += 1;
        }

        self.sink
            .publish(
                &state_topic(&basename),
                item.value.to_string().into_bytes(),
                false,
            )
            .await?;
        stats.state += 1;

        Ok(())
    }
}
