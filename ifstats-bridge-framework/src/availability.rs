//! Collector availability (online/offline) announcements.
//!
//! One retained availability topic is shared by every entity the collector
//! publishes. The broker delivers the "offline" last will when the collector
//! disconnects without saying goodbye.

use crate::error::Result;
use crate::publisher::MessageSink;

/// Payload announcing the collector is up.
pub const PAYLOAD_ONLINE: &str = "online";

/// Payload announcing the collector is gone.
pub const PAYLOAD_OFFLINE: &str = "offline";

/// The availability topic of one collector instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    topic: String,
}

impl Availability {
    /// Create an availability handle for a topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// The availability topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish "online", retained.
    pub async fn announce_online<S: MessageSink + ?Sized>(&self, sink: &S) -> Result<()> {
        sink.publish(&self.topic, PAYLOAD_ONLINE.as_bytes().to_vec(), true)
            .await?;
        tracing::info!(topic = %self.topic, "Announced collector online");
        Ok(())
    }

    /// Publish "offline", retained.
    pub async fn announce_offline<S: MessageSink + ?Sized>(&self, sink: &S) -> Result<()> {
        sink.publish(&self.topic, PAYLOAD_OFFLINE.as_bytes().to_vec(), true)
            .await?;
        tracing::info!(topic = %self.topic, "Announced collector offline");
        Ok(())
    }
}
