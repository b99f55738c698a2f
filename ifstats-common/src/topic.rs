use crate::error::{Error, Result};

/// Default discovery prefix watched by the home-automation consumer.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Default node namespace for the sensors published by this collector.
pub const DEFAULT_NAMESPACE: &str = "snmp_ifstats";

/// Builder for the broker topics used by the collector.
///
/// Topics follow the layout:
///
/// ```text
/// <prefix>/_meta/<instance_id>/status
/// <prefix>/sensor/<namespace>/<unique_id>-<field>/config
/// <prefix>/sensor/<namespace>/<unique_id>-<field>/state
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBuilder {
    prefix: String,
    namespace: String,
}

impl TopicBuilder {
    /// Create a builder for a prefix and namespace.
    ///
    /// Both must be non-empty and free of MQTT wildcards.
    pub fn new(prefix: impl Into<String>, namespace: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let namespace = namespace.into();
        validate_level("prefix", &prefix)?;
        validate_level("namespace", &namespace)?;
        Ok(Self { prefix, namespace })
    }

    /// The discovery prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The sensor namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Availability topic shared by every entity of one collector instance.
    ///
    /// # Example
    /// ```
    /// use ifstats_common::topic::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("homeassistant", "snmp_ifstats").unwrap();
    /// assert_eq!(
    ///     topics.availability_topic("0123abcd"),
    ///     "homeassistant/_meta/0123abcd/status"
    /// );
    /// ```
    pub fn availability_topic(&self, instance_id: &str) -> String {
        format!("{}/_meta/{}/status", self.prefix, instance_id)
    }

    /// Base topic (`~` in the discovery payload) of one entity.
    ///
    /// # Example
    /// ```
    /// use ifstats_common::topic::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("homeassistant", "snmp_ifstats").unwrap();
    /// assert_eq!(
    ///     topics.entity_basename("abcd-001122334455", "if_in_octets"),
    ///     "homeassistant/sensor/snmp_ifstats/abcd-001122334455-if_in_octets"
    /// );
    /// ```
    pub fn entity_basename(&self, unique_id: &str, field: &str) -> String {
        format!(
            "{}/sensor/{}/{}-{}",
            self.prefix, self.namespace, unique_id, field
        )
    }
}

/// Discovery (config) topic for an entity basename.
pub fn config_topic(basename: &str) -> String {
    format!("{}/config", basename)
}

/// State topic for an entity basename.
pub fn state_topic(basename: &str) -> String {
    format!("{}/state", basename)
}

fn validate_level(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Topic(format!("{} cannot be empty", what)));
    }
    if value.contains(['+', '#']) {
        return Err(Error::Topic(format!(
            "{} '{}' contains an MQTT wildcard",
            what, value
        )));
    }
    Ok(())
}
