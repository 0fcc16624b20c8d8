use crate::network::BtcNetwork;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid configuration file: {0}")]
    InvalidConfig(#[from] serde_yml::Error),
}

/// Provider settings, as injected by the host page.
///
/// ```yaml
/// bitcoin:
///   network: testnet
/// request_timeout_secs: 120
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub bitcoin: BitcoinConfig,
    /// Give up on requests that have not been answered after this many seconds. Absent or zero means wait forever.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcoinConfig {
    /// Network hint. Unsupported values are replaced by the primary network.
    pub network: Option<String>,
}

impl ProviderConfig {
    pub fn with_network<S: Into<String>>(mut self, network: S) -> Self {
        self.bitcoin.network = Some(network.into());
        self
    }

    /// Rounds up to whole seconds, so any non-zero `timeout` stays a timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.request_timeout_secs = Some(secs);
        self
    }

    /// The network the provider starts on.
    pub fn network(&self) -> BtcNetwork {
        BtcNetwork::from_hint(self.bitcoin.network.as_deref())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    pub fn from_yml(text: &str) -> Result<Self, ConfigError> {
        let config = serde_yml::from_str(text)?;
        Ok(config)
    }

    pub fn to_yml(&self) -> Result<String, ConfigError> {
        let s = serde_yml::to_string(self)?;
        Ok(s)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yml(&text)
    }
}
