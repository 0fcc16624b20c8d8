//! A deterministic in-memory wallet for demos and tests.
//!
//! Signatures and transaction ids are Blake2b-256 digests of the inputs, so they are stable across runs but carry
//! no cryptographic meaning.

use crate::extension::{HandlerOutcome, WalletHandler};
use async_trait::async_trait;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use libprovider::{BtcNetwork, RemoteMethod, SignatureScheme};
use log::*;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

type Blake2b256 = Blake2b<U32>;

pub const USER_REJECTED_CODE: i64 = 4001;
pub const DECODE_FAILED_CODE: i64 = -22;

fn digest_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

fn rejection(code: i64, message: impl Into<String>) -> HandlerOutcome {
    HandlerOutcome::Reject(json!({ "code": code, "message": message.into() }))
}

#[derive(Debug, Clone)]
pub struct MockWallet {
    accounts: Vec<String>,
    network: BtcNetwork,
    rejections: HashMap<String, Value>,
    silenced: HashSet<String>,
    broadcasts: Vec<String>,
    requests_seen: usize,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new(vec!["bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string()])
    }
}

impl MockWallet {
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            accounts,
            network: BtcNetwork::default(),
            rejections: HashMap::new(),
            silenced: HashSet::new(),
            broadcasts: Vec::new(),
            requests_seen: 0,
        }
    }

    pub fn on_network(mut self, network: BtcNetwork) -> Self {
        self.network = network;
        self
    }

    /// Reject every call to the given wire method with `error`.
    pub fn reject(mut self, method: &str, error: Value) -> Self {
        self.rejections.insert(method.to_string(), error);
        self
    }

    /// Never answer the given wire method.
    pub fn silence(mut self, method: &str) -> Self {
        self.silenced.insert(method.to_string());
        self
    }

    pub fn network(&self) -> BtcNetwork {
        self.network
    }

    /// Transaction ids broadcast so far, in order.
    pub fn broadcasts(&self) -> &[String] {
        &self.broadcasts
    }

    pub fn requests_seen(&self) -> usize {
        self.requests_seen
    }

    fn data<'a>(payload: &'a Value) -> Result<&'a str, HandlerOutcome> {
        payload["data"].as_str().ok_or_else(|| rejection(DECODE_FAILED_CODE, "Missing data field"))
    }

    fn hex_data(payload: &Value) -> Result<Vec<u8>, HandlerOutcome> {
        let data = Self::data(payload)?;
        hex::decode(data).map_err(|e| rejection(DECODE_FAILED_CODE, format!("Invalid hex data. {e}")))
    }

    fn sign_message(&self, payload: &Value) -> Result<Value, HandlerOutcome> {
        let message = Self::data(payload)?;
        let scheme = match payload["type"].as_str() {
            Some(s) => s.parse::<SignatureScheme>().map_err(|e| rejection(DECODE_FAILED_CODE, e.to_string()))?,
            None => SignatureScheme::default(),
        };
        let address = self.accounts.first().ok_or_else(|| rejection(USER_REJECTED_CODE, "No account"))?;
        let signature = digest_hex(&[scheme.as_str().as_bytes(), address.as_bytes(), message.as_bytes()]);
        Ok(json!(signature))
    }

    fn broadcast(&mut self, payload: &Value) -> Result<Value, HandlerOutcome> {
        let tx = Self::hex_data(payload)?;
        let txid = digest_hex(&[&tx[..]]);
        info!("MockWallet: broadcast {txid} on {}", self.network);
        self.broadcasts.push(txid.clone());
        Ok(json!(txid))
    }

    fn dispatch(&mut self, method: RemoteMethod, payload: &Value) -> Result<Value, HandlerOutcome> {
        match method {
            RemoteMethod::RequestAccounts => Ok(json!(self.accounts)),
            RemoteMethod::SwitchNetwork => {
                let network = payload["network"]
                    .as_str()
                    .and_then(|s| s.parse::<BtcNetwork>().ok())
                    .ok_or_else(|| rejection(DECODE_FAILED_CODE, "Unknown network"))?;
                self.network = network;
                Ok(json!(network.wire_name()))
            }
            RemoteMethod::SignMessage => self.sign_message(payload),
            RemoteMethod::SignPsbt => {
                // Signing is simulated by handing the PSBT back unchanged
                Self::hex_data(payload)?;
                Ok(json!(Self::data(payload)?))
            }
            RemoteMethod::PushPsbt | RemoteMethod::SubmitTransaction => self.broadcast(payload),
        }
    }
}

#[async_trait]
impl WalletHandler for MockWallet {
    async fn handle(&mut self, method: &str, payload: Value) -> HandlerOutcome {
        self.requests_seen += 1;
        if self.silenced.contains(method) {
            return HandlerOutcome::NoReply;
        }
        if let Some(error) = self.rejections.get(method) {
            return HandlerOutcome::Reject(error.clone());
        }
        let Some(remote) = RemoteMethod::from_wire_name(method) else {
            return rejection(4200, format!("The wallet does not support calling {method} yet."));
        };
        match self.dispatch(remote, &payload) {
            Ok(result) => HandlerOutcome::Reply(result),
            Err(outcome) => outcome,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn answers_every_wire_method() {
        let mut wallet = MockWallet::default();
        let accounts = wallet.handle("requestAccounts", json!({"network": "livenet"})).await;
        assert_eq!(accounts, HandlerOutcome::Reply(json!(["bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"])));

        let switched = wallet.handle("switchNetwork", json!({"network": "testnet"})).await;
        assert_eq!(switched, HandlerOutcome::Reply(json!("testnet")));
        assert_eq!(wallet.network(), BtcNetwork::Testnet);

        let HandlerOutcome::Reply(sig) = wallet.handle("signMessage", json!({"data": "hello", "type": "ecdsa"})).await
        else {
            panic!("signMessage failed");
        };
        assert_eq!(sig.as_str().unwrap().len(), 64);

        let psbt = wallet.handle("signPsbt", json!({"data": "70736274ff"})).await;
        assert_eq!(psbt, HandlerOutcome::Reply(json!("70736274ff")));

        let HandlerOutcome::Reply(txid) = wallet.handle("pushTx", json!({"data": "0200"})).await else {
            panic!("pushTx failed");
        };
        assert_eq!(wallet.broadcasts(), &[txid.as_str().unwrap().to_string()]);
        assert_eq!(wallet.requests_seen(), 5);
    }

    #[tokio::test]
    async fn signatures_depend_on_scheme() {
        let mut wallet = MockWallet::default();
        let a = wallet.handle("signMessage", json!({"data": "hello", "type": "ecdsa"})).await;
        let b = wallet.handle("signMessage", json!({"data": "hello", "type": "bip322-simple"})).await;
        let c = wallet.handle("signMessage", json!({"data": "hello", "type": "ecdsa"})).await;
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[tokio::test]
    async fn rejects_bad_input_and_unknown_methods() {
        let mut wallet = MockWallet::default();
        let bad_hex = wallet.handle("pushTx", json!({"data": "zz"})).await;
        assert!(matches!(bad_hex, HandlerOutcome::Reject(ref e) if e["code"] == DECODE_FAILED_CODE));
        let unknown = wallet.handle("submitTransaction", json!({"data": "00"})).await;
        assert!(matches!(unknown, HandlerOutcome::Reject(ref e) if e["code"] == 4200));
        assert!(wallet.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn scripted_rejections_and_silence() {
        let mut wallet = MockWallet::default()
            .reject("signPsbt", json!({"code": USER_REJECTED_CODE, "message": "User rejected"}))
            .silence("pushPsbt");
        let rejected = wallet.handle("signPsbt", json!({"data": "00"})).await;
        assert_eq!(rejected, HandlerOutcome::Reject(json!({"code": 4001, "message": "User rejected"})));
        assert_eq!(wallet.handle("pushPsbt", json!({"data": "00"})).await, HandlerOutcome::NoReply);
    }
}
