//! The page-facing Bitcoin provider.
//!
//! [`BtcProvider`] owns the session (current network, current address, connection flag) and presents every wallet
//! operation as an async call backed by the [`CorrelationEngine`]. Validation errors are returned before anything is
//! sent to the wallet; remote errors are passed through untouched.

use crate::config::ProviderConfig;
use crate::correlation::{CorrelationEngine, PendingReply, ReplyHandle, Transport};
use crate::error::ProviderError;
use crate::events::{EventBus, ProviderEvent};
use crate::network::BtcNetwork;
use crate::request::{RemoteRequest, SignatureScheme};
use futures::channel::mpsc;
use log::*;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Identifies which chain family this provider serves.
pub const PROVIDER_NETWORK: &str = "bitcoin";

/// The provider's view of the wallet, independent of any single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSession {
    pub network: BtcNetwork,
    pub address: Option<String>,
    pub connected: bool,
}

pub struct BtcProvider<T> {
    engine: CorrelationEngine<T>,
    session: Mutex<ProviderSession>,
    events: EventBus,
    request_timeout: Option<Duration>,
}

impl<T: Transport> BtcProvider<T> {
    pub fn new(config: &ProviderConfig, transport: T) -> Self {
        let session = ProviderSession { network: config.network(), address: None, connected: false };
        debug!("New {PROVIDER_NETWORK} provider on {}", session.network);
        Self {
            engine: CorrelationEngine::new(transport),
            session: Mutex::new(session),
            events: EventBus::new(),
            request_timeout: config.request_timeout(),
        }
    }

    fn session(&self) -> MutexGuard<'_, ProviderSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Where the transport should deliver inbound replies.
    pub fn reply_handle(&self) -> ReplyHandle {
        self.engine.reply_handle()
    }

    pub fn engine(&self) -> &CorrelationEngine<T> {
        &self.engine
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        self.events.subscribe()
    }

    pub fn provider_network(&self) -> &'static str {
        PROVIDER_NETWORK
    }

    /// A snapshot of the current session.
    pub fn snapshot(&self) -> ProviderSession {
        self.session().clone()
    }

    //------------------------------------------   Connection   ------------------------------------------------------

    /// Query the wallet's accounts and mark the session connected.
    pub async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        let accounts = self.account().await?;
        if self.is_connected() {
            info!("Connected to wallet");
            self.events.publish(ProviderEvent::Connect);
        } else {
            warn!("The wallet returned no accounts. Staying disconnected");
        }
        Ok(accounts)
    }

    /// Forget the current address. Purely local; the wallet is not contacted.
    pub fn disconnect(&self) {
        {
            let mut session = self.session();
            session.address = None;
            session.connected = false;
        }
        info!("Disconnected from wallet");
        self.events.publish(ProviderEvent::Disconnect);
    }

    pub fn is_connected(&self) -> bool {
        self.session().connected
    }

    /// Store a known address and mark the session connected, without asking the wallet.
    pub fn set_address<S: Into<String>>(&self, address: S) {
        let mut session = self.session();
        session.address = Some(address.into());
        session.connected = true;
    }

    pub fn address(&self) -> Option<String> {
        self.session().address.clone()
    }

    //------------------------------------------   Accounts   --------------------------------------------------------

    /// Ask the wallet for its accounts on the current network.
    ///
    /// The first account becomes the current address, `accountsChanged` is published, and the full list is returned.
    pub async fn account(&self) -> Result<Vec<String>, ProviderError> {
        let network = self.network();
        let value = self.call(RemoteRequest::RequestAccounts { network }).await?;
        let accounts: Vec<String> = serde_json::from_value(value)
            .map_err(|e| ProviderError::UnexpectedReply(format!("Expected a list of addresses. {e}")))?;
        {
            let mut session = self.session();
            session.address = accounts.first().cloned();
            session.connected = session.address.is_some();
        }
        debug!("Accounts: {accounts:?}");
        self.events.publish(ProviderEvent::AccountsChanged(accounts.clone()));
        Ok(accounts)
    }

    pub async fn get_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.account().await
    }

    pub async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.account().await
    }

    //------------------------------------------   Network   ---------------------------------------------------------

    pub fn network(&self) -> BtcNetwork {
        self.session().network
    }

    pub fn get_network(&self) -> BtcNetwork {
        self.network()
    }

    /// Ask the wallet to switch networks.
    ///
    /// `network` must be one of the supported wire names, otherwise nothing is sent. The wallet's reply is
    /// authoritative: the session adopts whatever network it echoes back, and `networkChanged` is published.
    pub async fn switch_network(&self, network: &str) -> Result<BtcNetwork, ProviderError> {
        let requested = network.parse::<BtcNetwork>()?;
        let value = self.call(RemoteRequest::SwitchNetwork { network: requested }).await?;
        let network: BtcNetwork = serde_json::from_value(value)
            .map_err(|e| ProviderError::UnexpectedReply(format!("Expected a supported network name. {e}")))?;
        self.session().network = network;
        info!("Switched to {network}");
        self.events.publish(ProviderEvent::NetworkChanged(network));
        Ok(network)
    }

    //------------------------------------------   Signing   ---------------------------------------------------------

    /// Sign `message` with the given scheme (`ecdsa` when `None`).
    pub async fn sign_message(&self, message: &str, scheme: Option<&str>) -> Result<Value, ProviderError> {
        let scheme = match scheme {
            Some(s) => s.parse::<SignatureScheme>()?,
            None => SignatureScheme::default(),
        };
        self.call(RemoteRequest::SignMessage { message: message.to_string(), scheme }).await
    }

    pub async fn sign_psbt(&self, psbt_hex: &str) -> Result<Value, ProviderError> {
        self.call(RemoteRequest::SignPsbt { psbt_hex: psbt_hex.to_string() }).await
    }

    pub async fn push_psbt(&self, psbt_hex: &str) -> Result<Value, ProviderError> {
        self.call(RemoteRequest::PushPsbt { psbt_hex: psbt_hex.to_string() }).await
    }

    pub async fn push_tx(&self, signed_tx_hex: &str) -> Result<Value, ProviderError> {
        self.call(RemoteRequest::SubmitTransaction { signed_tx_hex: signed_tx_hex.to_string() }).await
    }

    //------------------------------------------   Internal   --------------------------------------------------------

    async fn call(&self, request: RemoteRequest) -> Result<Value, ProviderError> {
        let reply = self.engine.issue(request);
        self.wait_for(reply).await
    }

    async fn wait_for(&self, reply: PendingReply) -> Result<Value, ProviderError> {
        let Some(limit) = self.request_timeout else {
            return reply.await;
        };
        let id = reply.id();
        match tokio::time::timeout(limit, reply).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Request {id} got no reply within {limit:?}");
                if !self.engine.abandon(id) {
                    warn!("A reply for request {id} was delivered as it timed out. The wallet may have acted on it.");
                }
                Err(ProviderError::Timeout { id })
            }
        }
    }
}
