use crate::error::ProviderError;
use crate::method::RemoteMethod;
use crate::network::BtcNetwork;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Message signature schemes the wallet supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureScheme {
    #[default]
    #[serde(rename = "ecdsa")]
    Ecdsa,
    #[serde(rename = "bip322-simple")]
    Bip322Simple,
}

impl SignatureScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::Ecdsa => "ecdsa",
            SignatureScheme::Bip322Simple => "bip322-simple",
        }
    }
}

impl FromStr for SignatureScheme {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ecdsa" => Ok(SignatureScheme::Ecdsa),
            "bip322-simple" => Ok(SignatureScheme::Bip322Simple),
            _ => Err(ProviderError::InvalidParams(format!(
                "Unsupported signature type '{s}'. The only supported types are: ecdsa | bip322-simple"
            ))),
        }
    }
}

impl Display for SignatureScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote operation together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    RequestAccounts { network: BtcNetwork },
    SwitchNetwork { network: BtcNetwork },
    SignMessage { message: String, scheme: SignatureScheme },
    SignPsbt { psbt_hex: String },
    PushPsbt { psbt_hex: String },
    SubmitTransaction { signed_tx_hex: String },
}

impl RemoteRequest {
    pub fn method(&self) -> RemoteMethod {
        match self {
            RemoteRequest::RequestAccounts { .. } => RemoteMethod::RequestAccounts,
            RemoteRequest::SwitchNetwork { .. } => RemoteMethod::SwitchNetwork,
            RemoteRequest::SignMessage { .. } => RemoteMethod::SignMessage,
            RemoteRequest::SignPsbt { .. } => RemoteMethod::SignPsbt,
            RemoteRequest::PushPsbt { .. } => RemoteMethod::PushPsbt,
            RemoteRequest::SubmitTransaction { .. } => RemoteMethod::SubmitTransaction,
        }
    }

    /// The JSON payload the extension expects for this operation.
    pub fn payload(&self) -> Value {
        match self {
            RemoteRequest::RequestAccounts { network } | RemoteRequest::SwitchNetwork { network } => {
                json!({ "network": network.wire_name() })
            }
            RemoteRequest::SignMessage { message, scheme } => json!({ "data": message, "type": scheme.as_str() }),
            RemoteRequest::SignPsbt { psbt_hex } | RemoteRequest::PushPsbt { psbt_hex } => json!({ "data": psbt_hex }),
            RemoteRequest::SubmitTransaction { signed_tx_hex } => json!({ "data": signed_tx_hex }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn signature_schemes() {
        assert_eq!("ecdsa".parse::<SignatureScheme>().unwrap(), SignatureScheme::Ecdsa);
        assert_eq!("bip322-simple".parse::<SignatureScheme>().unwrap(), SignatureScheme::Bip322Simple);
        let err = "xyz".parse::<SignatureScheme>().unwrap_err();
        assert!(matches!(err, ProviderError::InvalidParams(_)));
        assert!(err.to_string().starts_with("Invalid params."));
        assert_eq!(SignatureScheme::default(), SignatureScheme::Ecdsa);
    }

    #[test]
    fn payload_shapes() {
        let req = RemoteRequest::SignMessage { message: "hello".into(), scheme: SignatureScheme::Bip322Simple };
        assert_eq!(req.method(), RemoteMethod::SignMessage);
        assert_eq!(req.payload(), json!({"data": "hello", "type": "bip322-simple"}));

        let req = RemoteRequest::SwitchNetwork { network: BtcNetwork::Segnet };
        assert_eq!(req.payload(), json!({"network": "segnet"}));

        let req = RemoteRequest::SubmitTransaction { signed_tx_hex: "0200".into() };
        assert_eq!(req.method().wire_name(), "pushTx");
        assert_eq!(req.payload(), json!({"data": "0200"}));
    }
}
