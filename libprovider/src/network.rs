//! The closed set of Bitcoin networks the wallet extension understands.
//!
//! The wire spellings (`livenet`, `testnet`, `segnet`) are shared with the extension and must not change.

use crate::error::ProviderError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// All supported networks, in the order they are reported in error messages.
pub const SUPPORTED_NETWORKS: [BtcNetwork; 3] = [BtcNetwork::Mainnet, BtcNetwork::Testnet, BtcNetwork::Segnet];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BtcNetwork {
    /// The primary network. Spelled `livenet` on the wire.
    #[default]
    #[serde(rename = "livenet")]
    Mainnet,
    #[serde(rename = "testnet")]
    Testnet,
    #[serde(rename = "segnet")]
    Segnet,
}

impl BtcNetwork {
    /// The name the wallet extension uses for this network.
    pub fn wire_name(&self) -> &'static str {
        match self {
            BtcNetwork::Mainnet => "livenet",
            BtcNetwork::Testnet => "testnet",
            BtcNetwork::Segnet => "segnet",
        }
    }

    /// Resolve an optional, caller-supplied network hint.
    ///
    /// Absent or unrecognised hints fall back to [`BtcNetwork::Mainnet`], so construction always ends with a valid
    /// network.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::parse::<BtcNetwork>) {
            Some(Ok(network)) => network,
            Some(Err(_)) => {
                warn!("Ignoring unsupported network hint {:?}. Using {}", hint, BtcNetwork::default());
                BtcNetwork::default()
            }
            None => BtcNetwork::default(),
        }
    }

    /// Comma-separated list of every supported wire name, e.g. for error messages.
    pub fn supported_list() -> String {
        SUPPORTED_NETWORKS.iter().map(BtcNetwork::wire_name).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for BtcNetwork {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_NETWORKS.iter().copied().find(|n| n.wire_name() == s).ok_or_else(|| {
            ProviderError::UnsupportedNetwork { network: s.to_string(), supported: BtcNetwork::supported_list() }
        })
    }
}

impl Display for BtcNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_wire_names_only() {
        assert_eq!("livenet".parse::<BtcNetwork>().unwrap(), BtcNetwork::Mainnet);
        assert_eq!("testnet".parse::<BtcNetwork>().unwrap(), BtcNetwork::Testnet);
        assert_eq!("segnet".parse::<BtcNetwork>().unwrap(), BtcNetwork::Segnet);
        // The human name is not a wire name
        assert!("mainnet".parse::<BtcNetwork>().is_err());
        assert!("LIVENET".parse::<BtcNetwork>().is_err());
    }

    #[test]
    fn unsupported_network_names_the_offender_and_the_set() {
        let err = "mainnet-typo".parse::<BtcNetwork>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("mainnet-typo"), "{msg}");
        assert!(msg.contains("livenet, testnet, segnet"), "{msg}");
    }

    #[test]
    fn hints_fall_back_to_mainnet() {
        assert_eq!(BtcNetwork::from_hint(None), BtcNetwork::Mainnet);
        assert_eq!(BtcNetwork::from_hint(Some("regtest")), BtcNetwork::Mainnet);
        assert_eq!(BtcNetwork::from_hint(Some("")), BtcNetwork::Mainnet);
        assert_eq!(BtcNetwork::from_hint(Some("segnet")), BtcNetwork::Segnet);
    }

    #[test]
    fn serializes_as_wire_name() {
        let json = serde_json::to_string(&BtcNetwork::Mainnet).unwrap();
        assert_eq!(json, "\"livenet\"");
        let net: BtcNetwork = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(net, BtcNetwork::Testnet);
    }
}
