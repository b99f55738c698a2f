//! CLI argument parsing for bridges.

use std::path::PathBuf;

use clap::Parser;

/// Command line of a collector.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Publish device interface statistics to MQTT")]
pub struct BridgeArgs {
    /// JSON5 configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Run a single poll/publish cycle, then go offline and exit.
    #[arg(long)]
    pub once: bool,
}

impl BridgeArgs {
    /// Parse the process arguments, with `default_config` used when
    /// `--config` is absent.
    ///
    /// Exits with clap's usage message on invalid arguments.
    pub fn parse_with_default(default_config: &'static str) -> Self {
        let matches = <Self as clap::CommandFactory>::command()
            .mut_arg("config", |arg| arg.default_value(default_config))
            .get_matches();

        <Self as clap::FromArgMatches>::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_iter() {
        let args =
            BridgeArgs::try_parse_from(["bridge", "-c", "test.json5", "--log-level", "debug"])
                .unwrap();
        assert_eq!(args.config, PathBuf::from("test.json5"));
        assert_eq!(args.log_level, Some("debug".to_string()));
        assert!(!args.once);
    }

    #[test]
    fn test_args_once() {
        let args = BridgeArgs::try_parse_from(["bridge", "--config", "a.json5", "--once"]).unwrap();
        assert!(args.once);
    }

    #[test]
    fn test_args_require_config() {
        assert!(BridgeArgs::try_parse_from(["bridge"]).is_err());
    }
}
