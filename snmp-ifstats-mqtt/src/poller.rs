use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snmp2::{AsyncSession, Value};
use tokio::time::timeout;

use ifstats_bridge_framework::{DiscoveryPublisher, MessageSink, SnapshotSource};
use ifstats_common::{DeviceSnapshot, current_timestamp_secs, host_hash};

use crate::assembler::{DeviceRecordAssembler, InterfaceFilter, RawSample, RawType};
use crate::config::{ResolvedDevice, SnmpVersion};
use crate::deriver::MetricDeriver;
use crate::error::{PollError, Result};
use crate::mib::ColumnResolver;
use crate::oid::{WALK_ROOTS, oid_starts_with, oid_to_string, parse_oid};

/// One varbind returned by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub oid: String,
    pub raw_type: RawType,
    pub value: Vec<u8>,
}

impl WalkEntry {
    pub fn new(oid: impl Into<String>, raw_type: RawType, value: impl Into<Vec<u8>>) -> Self {
        Self {
            oid: oid.into(),
            raw_type,
            value: value.into(),
        }
    }
}

/// Walks a subtree of a device's MIB.
#[async_trait]
pub trait TreeWalker: Send {
    /// Every varbind under `subtree`, in walk order.
    async fn walk(&mut self, subtree: &str) -> Result<Vec<WalkEntry>>;
}

/// GETNEXT walker over an snmp2 session.
pub struct SnmpWalker {
    host: String,
    address: String,
    community: String,
    version: SnmpVersion,
    request_timeout: Duration,
}

impl SnmpWalker {
    pub fn new(device: &ResolvedDevice, request_timeout: Duration) -> Self {
        Self {
            host: device.host.clone(),
            address: device.address(),
            community: device.community.clone(),
            version: device.version,
            request_timeout,
        }
    }

    /// Create an SNMP session for this device.
    async fn create_session(&self) -> Result<AsyncSession> {
        let community = self.community.as_bytes();

        let session = match self.version {
            SnmpVersion::V1 => AsyncSession::new_v1(&self.address, community, 0).await,
            SnmpVersion::V2c => AsyncSession::new_v2c(&self.address, community, 0).await,
        };

        session.map_err(|e| PollError::Session {
            host: self.host.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl TreeWalker for SnmpWalker {
    async fn walk(&mut self, subtree_str: &str) -> Result<Vec<WalkEntry>> {
        let subtree = parse_oid(subtree_str)?;
        let mut results = Vec::new();
        let mut current_oid = subtree.clone();
        let mut session = self.create_session().await?;

        loop {
            let response = timeout(self.request_timeout, session.getnext(&current_oid))
                .await
                .map_err(|_| PollError::Timeout {
                    host: self.host.clone(),
                })?
                .map_err(|e| PollError::Walk {
                    subtree: subtree_str.to_string(),
                    message: e.to_string(),
                })?;

            let Some((resp_oid, value)) = response.varbinds.into_iter().next() else {
                break;
            };

            // Check if we're still within the subtree
            if !oid_starts_with(&resp_oid, &subtree) {
                break;
            }

            // Check for end of MIB
            if matches!(value, Value::EndOfMibView) {
                break;
            }

            let oid_string = oid_to_string(&resp_oid);

            // An agent that does not advance would loop forever
            if oid_string == oid_to_string(&current_oid) {
                break;
            }

            if let Some((raw_type, raw)) = raw_value(&value) {
                tracing::trace!(host = %self.host, oid = %oid_string, ?raw_type, "Walked varbind");
                results.push(WalkEntry::new(oid_string, raw_type, raw));
            }

            current_oid = resp_oid.to_owned();
        }

        Ok(results)
    }
}

/// Convert an SNMP value to its type tag and raw octets.
///
/// Numbers are rendered as decimal text.
fn raw_value(value: &Value) -> Option<(RawType, Vec<u8>)> {
    match value {
        Value::OctetString(s) => Some((RawType::OctetString, s.to_vec())),
        Value::Integer(n) => Some((RawType::Integer, n.to_string().into_bytes())),
        Value::Counter32(n) => Some((RawType::Counter32, n.to_string().into_bytes())),
        Value::Unsigned32(n) => Some((RawType::Gauge32, n.to_string().into_bytes())),
        Value::Timeticks(n) => Some((RawType::TimeTicks, n.to_string().into_bytes())),
        Value::Counter64(n) => Some((RawType::Counter64, n.to_string().into_bytes())),
        Value::IpAddress(ip) => Some((
            RawType::IpAddress,
            format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]).into_bytes(),
        )),
        Value::ObjectIdentifier(oid) => {
            Some((RawType::ObjectIdentifier, oid_to_string(oid).into_bytes()))
        }
        Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => None,
        _ => None,
    }
}

/// Walker replaying a fixed set of varbinds.
///
/// Serves every entry under the requested subtree. Used in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWalker {
    entries: Vec<WalkEntry>,
    failing: bool,
}

impl ScriptedWalker {
    pub fn new(entries: Vec<WalkEntry>) -> Self {
        Self {
            entries,
            failing: false,
        }
    }

    /// Replace the served entries.
    pub fn replace(&mut self, entries: Vec<WalkEntry>) {
        self.entries = entries;
    }

    /// Make subsequent walks fail as if the device were unreachable.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

#[async_trait]
impl TreeWalker for ScriptedWalker {
    async fn walk(&mut self, subtree: &str) -> Result<Vec<WalkEntry>> {
        if self.failing {
            return Err(PollError::Timeout {
                host: "scripted".to_string(),
            });
        }

        let prefix = format!("{}.", subtree);
        Ok(self
            .entries
            .iter()
            .filter(|e| e.oid.starts_with(&prefix))
            .cloned()
            .collect())
    }
}

/// Polls one device and turns its tables into snapshots.
pub struct PollingConnection<W> {
    host: String,
    walker: W,
    assembler: DeviceRecordAssembler,
    deriver: MetricDeriver,
    resolver: Arc<ColumnResolver>,
}

impl PollingConnection<SnmpWalker> {
    /// Create a connection to a configured device.
    pub fn connect(
        device: &ResolvedDevice,
        request_timeout: Duration,
        resolver: Arc<ColumnResolver>,
    ) -> Self {
        let walker = SnmpWalker::new(device, request_timeout);
        Self::new(&device.host, walker, device.filter.clone(), resolver)
    }
}

impl<W: TreeWalker> PollingConnection<W> {
    pub fn new(
        host: impl Into<String>,
        walker: W,
        filter: InterfaceFilter,
        resolver: Arc<ColumnResolver>,
    ) -> Self {
        let host = host.into();
        let deriver = MetricDeriver::new(host_hash(&host));

        Self {
            host,
            walker,
            assembler: DeviceRecordAssembler::new(filter),
            deriver,
            resolver,
        }
    }

    pub fn walker_mut(&mut self) -> &mut W {
        &mut self.walker
    }

    /// Walk the device tables and resolve every varbind to a sample.
    async fn samples(&mut self) -> Result<Vec<RawSample>> {
        let mut samples = Vec::new();

        for root in WALK_ROOTS {
            let entries = self.walker.walk(root).await?;
            tracing::trace!(host = %self.host, subtree = %root, entries = entries.len(), "Walk complete");

            for entry in entries {
                match self.resolver.resolve(&entry.oid) {
                    Some((field, index)) => {
                        samples.push(RawSample::new(index, field, entry.value, entry.raw_type));
                    }
                    None => {
                        tracing::debug!(host = %self.host, oid = %entry.oid, "Skipping unknown column");
                    }
                }
            }
        }

        Ok(samples)
    }

    /// Poll the device, timing rates at `now` (seconds).
    pub async fn collect_at(&mut self, now: f64) -> Result<Vec<DeviceSnapshot>> {
        let samples = self.samples().await?;
        let interfaces = self.assembler.assemble(samples)?;
        Ok(self.deriver.derive(&interfaces, now))
    }

    /// Poll the device.
    pub async fn collect(&mut self) -> Result<Vec<DeviceSnapshot>> {
        self.collect_at(current_timestamp_secs()).await
    }

    /// Poll the device and queue its snapshots on `publisher`.
    pub async fn poll<S: MessageSink>(
        &mut self,
        publisher: &mut DiscoveryPublisher<S>,
    ) -> Result<usize> {
        let snapshots = self.collect().await?;
        let count = snapshots.len();

        for snapshot in snapshots {
            publisher.queue(snapshot);
        }

        tracing::debug!(host = %self.host, interfaces = count, "Queued device snapshots");
        Ok(count)
    }
}

#[async_trait]
impl<W: TreeWalker> SnapshotSource for PollingConnection<W> {
    type Error = PollError;

    fn name(&self) -> &str {
        &self.host
    }

    async fn poll_into<S: MessageSink>(
        &mut self,
        publisher: &mut DiscoveryPublisher<S>,
    ) -> std::result::Result<usize, PollError> {
        self.poll(publisher).await
    }
}
