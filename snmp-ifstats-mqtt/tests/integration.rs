//! Integration tests for snmp-ifstats-mqtt.

use std::sync::Arc;

use ifstats_bridge_framework::{
    BridgeConfig, DiscoveryPublisher, MemorySink, PublishedMessage, run_cycle,
};
use snmp_ifstats_mqtt::assembler::{InterfaceFilter, RawType};
use snmp_ifstats_mqtt::config::SnmpIfstatsConfig;
use snmp_ifstats_mqtt::mib::ColumnResolver;
use snmp_ifstats_mqtt::poller::{PollingConnection, ScriptedWalker, WalkEntry};

const HOST: &str = "192.168.1.1";
const HOST_HASH: &str = "c5eb5a4cc76a5cdb16e79864b9ccd26c";

fn if_column(column: u32, index: u32, raw_type: RawType, value: &[u8]) -> WalkEntry {
    WalkEntry::new(format!("1.3.6.1.2.1.2.2.1.{column}.{index}"), raw_type, value)
}

/// A DSL modem with one line and a loopback.
fn modem(in_octets: u64, atn_tenths: u32) -> Vec<WalkEntry> {
    let mut entries = vec![
        if_column(1, 1, RawType::Integer, b"1"),
        if_column(2, 1, RawType::OctetString, b"lo"),
        if_column(3, 1, RawType::Integer, b"24"),
        if_column(4, 1, RawType::Integer, b"16436"),
        if_column(6, 1, RawType::OctetString, &[]),
        if_column(10, 1, RawType::Counter32, b"0"),
        if_column(1, 4, RawType::Integer, b"4"),
        if_column(2, 4, RawType::OctetString, b"dsl0\0"),
        if_column(3, 4, RawType::Integer, b"94"),
        if_column(4, 4, RawType::Integer, b"1500"),
        if_column(5, 4, RawType::Gauge32, b"0"),
        if_column(6, 4, RawType::OctetString, &[0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]),
        if_column(10, 4, RawType::Counter32, in_octets.to_string().as_bytes()),
        if_column(22, 4, RawType::ObjectIdentifier, b"0.0"),
    ];
    entries.push(WalkEntry::new(
        "1.3.6.1.2.1.10.94.1.1.2.1.5.4",
        RawType::Gauge32,
        atn_tenths.to_string().into_bytes(),
    ));
    entries.push(WalkEntry::new(
        "1.3.6.1.2.1.10.94.1.1.2.1.8.4",
        RawType::Gauge32,
        b"24000000".to_vec(),
    ));
    entries.push(WalkEntry::new(
        "1.3.6.1.2.1.10.94.1.1.6.1.1.4",
        RawType::Counter32,
        b"3".to_vec(),
    ));
    entries.push(WalkEntry::new(
        "1.3.6.1.2.1.10.94.1.1.10.1.3.4",
        RawType::Counter32,
        b"12".to_vec(),
    ));
    entries
}

fn parse_config(content: &str) -> SnmpIfstatsConfig {
    let config: SnmpIfstatsConfig = ifstats_common::parse_config(content).unwrap();
    config.validate().unwrap();
    config
}

fn find<'a>(messages: &'a [PublishedMessage], suffix: &str) -> Vec<&'a PublishedMessage> {
    messages.iter().filter(|m| m.topic.ends_with(suffix)).collect()
}

#[tokio::test]
async fn test_walk_to_broker_messages() {
    let config = parse_config(&format!(
        r#"{{ snmp: {{ exclude: ["lo"], devices: [{{ host: "{HOST}" }}] }} }}"#
    ));
    let devices = config.snmp.resolve_devices();
    let device = &devices[0];

    let mut connections = vec![PollingConnection::new(
        &device.host,
        ScriptedWalker::new(modem(1_000_000, 215)),
        device.filter.clone(),
        Arc::new(ColumnResolver::builtin()),
    )];

    let topics = config.topics().unwrap();
    let availability = topics.availability_topic(&config.instance_id());
    let mut publisher = DiscoveryPublisher::new(MemorySink::new(), topics, availability.clone());

    run_cycle(&mut connections, &mut publisher).await.unwrap();

    let messages = publisher.sink().messages();
    let base = format!("homeassistant/sensor/snmp_ifstats/{HOST_HASH}-001a2b3c4d5e");

    // loopback excluded
    assert!(messages.iter().all(|m| !m.topic.contains("-_lo-")));

    let mtu = find(&messages, &format!("{base}-if_mtu/state"));
    assert_eq!(mtu.len(), 1);
    assert_eq!(mtu[0].payload_str(), "1500");
    assert!(!mtu[0].retain);

    let atn = find(&messages, &format!("{base}-adsl_atuc_curr_atn/state"));
    assert_eq!(atn[0].payload_str(), "21.5");

    let config_msg = find(&messages, &format!("{base}-adsl_atuc_curr_attainable_rate/config"));
    assert_eq!(config_msg.len(), 1);
    assert!(config_msg[0].retain);
    let payload: serde_json::Value = serde_json::from_slice(&config_msg[0].payload).unwrap();
    assert_eq!(payload["unit_of_measurement"], "bits/s");
    assert_eq!(payload["name"], "dsl0 adsl_atuc_curr_attainable_rate");
    assert_eq!(payload["availability"][0]["topic"], availability.as_str());

    // performance tables are published like the line tables
    let lofs = find(&messages, &format!("{base}-adsl_atuc_perf_lofs/state"));
    assert_eq!(lofs[0].payload_str(), "3");
    let corrected = find(&messages, &format!("{base}-adsl_atuc_chan_corrected_blks/state"));
    assert_eq!(corrected[0].payload_str(), "12");

    // ignored and empty fields never reach the broker
    for hidden in ["if_index", "if_type", "if_specific", "if_speed"] {
        assert!(
            messages.iter().all(|m| !m.topic.contains(&format!("-{hidden}/"))),
            "{hidden} published"
        );
    }

    // no rate before the second poll
    assert!(messages.iter().all(|m| !m.topic.contains("if_in_octets_ps")));
}

#[tokio::test]
async fn test_second_cycle_publishes_rates_and_only_changed_configs() {
    let mut connections = vec![PollingConnection::new(
        HOST,
        ScriptedWalker::new(modem(1_000_000, 215)),
        InterfaceFilter::new(vec!["dsl0".into()], vec![]),
        Arc::new(ColumnResolver::builtin()),
    )];
    let topics = ifstats_common::TopicBuilder::new("homeassistant", "snmp_ifstats").unwrap();
    let mut publisher =
        DiscoveryPublisher::new(MemorySink::new(), topics, "homeassistant/_meta/x/status");

    let first = connections[0].collect_at(1000.0).await.unwrap();
    for snapshot in first {
        publisher.queue(snapshot);
    }
    let first_stats = publisher.publish().await.unwrap();
    assert_eq!(first_stats.discovery, first_stats.state);

    publisher.sink().clear();
    connections[0]
        .walker_mut()
        .replace(modem(1_000_000 + 50_000, 215));
    for snapshot in connections[0].collect_at(1010.0).await.unwrap() {
        publisher.queue(snapshot);
    }
    let second_stats = publisher.publish().await.unwrap();

    // only the new rate entity is announced
    assert_eq!(second_stats.discovery, 1);
    let messages = publisher.sink().messages();
    let configs = find(&messages, "/config");
    assert_eq!(configs.len(), 1);
    assert!(configs[0].topic.ends_with("-if_in_octets_ps/config"));

    let rate = find(&messages, "-if_in_octets_ps/state");
    assert_eq!(rate[0].payload_str(), "5000.0");

    // counter reset publishes an empty rate
    publisher.sink().clear();
    connections[0].walker_mut().replace(modem(10, 215));
    for snapshot in connections[0].collect_at(1020.0).await.unwrap() {
        publisher.queue(snapshot);
    }
    publisher.publish().await.unwrap();

    let messages = publisher.sink().messages();
    let rate = find(&messages, "-if_in_octets_ps/state");
    assert_eq!(rate[0].payload_str(), "");
    assert!(find(&messages, "/config").is_empty());
}

#[tokio::test]
async fn test_unreachable_device_does_not_block_others() {
    let resolver = Arc::new(ColumnResolver::builtin());
    let mut down = ScriptedWalker::new(vec![]);
    down.set_failing(true);

    let mut connections = vec![
        PollingConnection::new("10.0.0.99", down, InterfaceFilter::default(), resolver.clone()),
        PollingConnection::new(
            HOST,
            ScriptedWalker::new(modem(0, 100)),
            InterfaceFilter::default(),
            resolver,
        ),
    ];
    let topics = ifstats_common::TopicBuilder::new("homeassistant", "snmp_ifstats").unwrap();
    let mut publisher =
        DiscoveryPublisher::new(MemorySink::new(), topics, "homeassistant/_meta/x/status");

    let sent = run_cycle(&mut connections, &mut publisher).await.unwrap();

    assert!(sent > 0);
    let messages = publisher.sink().messages();
    assert!(messages.iter().all(|m| m.topic.contains(HOST_HASH)));
    assert!(!find(&messages, &format!("{HOST_HASH}-_lo-if_mtu/state")).is_empty());
}
