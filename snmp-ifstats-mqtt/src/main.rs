//! SNMP interface statistics to MQTT.

use std::sync::Arc;

use anyhow::{Context, Result};
use ifstats_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};

use snmp_ifstats_mqtt::config::SnmpIfstatsConfig;
use snmp_ifstats_mqtt::mib::ColumnResolver;
use snmp_ifstats_mqtt::poller::PollingConnection;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = BridgeArgs::parse_with_default("snmp-ifstats.json5");

    let config = SnmpIfstatsConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let runner = BridgeRunner::new_with_args("snmp-ifstats-mqtt", config, Some(&args))
        .await
        .context("Failed to start bridge")?;

    let snmp = &runner.config().snmp;

    let mut resolver = ColumnResolver::builtin();
    resolver.add_custom_mappings(&snmp.column_names);
    let resolver = Arc::new(resolver);

    tracing::info!(
        modules = ?resolver.loaded_modules(),
        columns = resolver.column_count(),
        "Column tables loaded"
    );

    let connections: Vec<_> = snmp
        .resolve_devices()
        .iter()
        .map(|device| {
            tracing::info!(
                host = %device.host,
                address = %device.address(),
                version = ?device.version,
                "Configured device"
            );
            PollingConnection::connect(device, snmp.request_timeout(), resolver.clone())
        })
        .collect();

    let period = snmp.poll_interval();

    if args.once {
        return runner
            .run_once(connections)
            .await
            .context("Polling cycle failed");
    }

    // Run until Ctrl+C
    runner
        .run(connections, period)
        .await
        .context("Bridge stopped with an error")
}
