use clap::{Args, Parser, Subcommand};
use libprovider::{ConfigError, ProviderConfig};
use log::*;
use std::path::PathBuf;

/// Bitcoin wallet provider harness.
///
/// Runs a provider against an in-memory wallet over the message bridge and performs a single operation.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Path to a YAML provider configuration file.
    #[arg(long = "config-file", short = 'c', env = "BTC_PROVIDER_CONFIG")]
    pub config_file: Option<PathBuf>,
    /// Network to start on (livenet, testnet or segnet). Overrides the configuration file.
    #[arg(long = "network", short = 'n')]
    pub network: Option<String>,
    /// Give up on requests after this many seconds. Overrides the configuration file.
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,
    #[command(flatten)]
    pub wallet: WalletOptions,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Args)]
pub struct WalletOptions {
    /// Addresses held by the mock wallet. May be repeated.
    #[arg(long = "address", short = 'a', default_value = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq")]
    pub addresses: Vec<String>,
    /// Make the mock wallet reject every call to this wire method, e.g. `pushTx`.
    #[arg(long = "reject")]
    pub reject: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Request accounts and mark the session connected.
    #[command(name = "connect")]
    Connect,
    /// Request the wallet's accounts.
    #[command(name = "accounts", alias = "account")]
    Accounts,
    /// Print the current network.
    #[command(name = "network")]
    Network,
    /// Ask the wallet to switch networks.
    #[command(name = "switch-network", alias = "switch")]
    SwitchNetwork {
        /// livenet, testnet or segnet.
        network: String,
    },
    /// Sign a message.
    #[command(name = "sign-message")]
    SignMessage {
        message: String,
        /// Signature scheme: ecdsa or bip322-simple.
        #[arg(long = "type", short = 't')]
        scheme: Option<String>,
    },
    /// Sign a hex-encoded PSBT.
    #[command(name = "sign-psbt")]
    SignPsbt { psbt_hex: String },
    /// Broadcast a hex-encoded PSBT.
    #[command(name = "push-psbt")]
    PushPsbt { psbt_hex: String },
    /// Broadcast a hex-encoded signed transaction.
    #[command(name = "push-tx")]
    PushTx { signed_tx_hex: String },
    /// Run every operation in turn.
    #[command(name = "demo")]
    Demo,
}

pub struct GlobalOptions {
    pub config_file: Option<PathBuf>,
    pub network: Option<String>,
    pub timeout_secs: Option<u64>,
    pub wallet: WalletOptions,
}

impl Config {
    pub fn to_parts(self) -> (GlobalOptions, CliCommand) {
        let global = GlobalOptions {
            config_file: self.config_file,
            network: self.network,
            timeout_secs: self.timeout_secs,
            wallet: self.wallet,
        };
        (global, self.command)
    }
}

impl GlobalOptions {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => {
                info!("Loading provider configuration from {}", path.display());
                ProviderConfig::load(path)?
            }
            None => ProviderConfig::default(),
        };
        if let Some(network) = &self.network {
            config = config.with_network(network.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use libprovider::BtcNetwork;
    use std::time::Duration;

    #[test]
    fn parses_subcommands() {
        let config = Config::parse_from(["btc-provider", "-n", "testnet", "sign-message", "hi", "-t", "bip322-simple"]);
        let (global, command) = config.to_parts();
        assert_eq!(global.network.as_deref(), Some("testnet"));
        assert_eq!(global.wallet.addresses, vec!["bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string()]);
        match command {
            CliCommand::SignMessage { message, scheme } => {
                assert_eq!(message, "hi");
                assert_eq!(scheme.as_deref(), Some("bip322-simple"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn command_line_overrides() {
        let config = Config::parse_from(["btc-provider", "--network", "segnet", "--timeout", "9", "network"]);
        let (global, _) = config.to_parts();
        let provider_config = global.provider_config().unwrap();
        assert_eq!(provider_config.network(), BtcNetwork::Segnet);
        assert_eq!(provider_config.request_timeout(), Some(Duration::from_secs(9)));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let config = Config::parse_from(["btc-provider", "-c", "./no/such/file.yml", "network"]);
        let (global, _) = config.to_parts();
        assert!(matches!(global.provider_config(), Err(ConfigError::IoError(_))));
    }
}
