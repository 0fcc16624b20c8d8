//! Message bridge between an in-page [`BtcProvider`] and a wallet extension.
//!
//! Frames cross the boundary as JSON text over unbounded channels, the way `postMessage` carries them in a browser:
//!
//! - [`ChannelTransport`] is the page's outbound half and implements [`libprovider::Transport`].
//! - [`ReplyPump`] is the page's inbound half. It decodes reply text and delivers it to the provider's
//!   [`libprovider::ReplyHandle`].
//! - [`ExtensionLoop`] plays the extension: it decodes requests, asks a [`WalletHandler`] and posts replies.
//! - [`MockWallet`] is a deterministic [`WalletHandler`].

pub mod codec;
pub mod errors;
pub mod extension;
pub mod mock_wallet;
mod reply_pump;
mod transport;

pub use errors::BridgeError;
pub use extension::{ExtensionLoop, HandlerOutcome, WalletHandler};
pub use mock_wallet::MockWallet;
pub use reply_pump::ReplyPump;
pub use transport::ChannelTransport;

use futures::channel::mpsc;
use libprovider::{BtcProvider, ProviderConfig};
use log::*;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Both ends of a freshly created bridge.
pub struct BridgeChannels {
    /// Page → extension.
    pub transport: ChannelTransport,
    /// Replies arriving at the page.
    pub page_inbox: mpsc::UnboundedReceiver<String>,
    /// Requests arriving at the extension.
    pub extension_requests: mpsc::UnboundedReceiver<String>,
    /// Extension → page.
    pub extension_replies: mpsc::UnboundedSender<String>,
}

pub fn new_bridge() -> BridgeChannels {
    let (request_tx, request_rx) = mpsc::unbounded();
    let (reply_tx, reply_rx) = mpsc::unbounded();
    BridgeChannels {
        transport: ChannelTransport::new(request_tx),
        page_inbox: reply_rx,
        extension_requests: request_rx,
        extension_replies: reply_tx,
    }
}

/// A provider connected to a wallet handler, with both bridge tasks running.
pub struct RunningBridge<H> {
    pub provider: Arc<BtcProvider<ChannelTransport>>,
    /// Finishes, returning the handler, once every clone of the provider's transport is dropped.
    pub extension: JoinHandle<H>,
    /// Finishes once the extension loop has stopped. Yields the number of settled requests.
    pub pump: JoinHandle<usize>,
}

/// Create a provider, wire it to `handler` and spawn the extension loop and reply pump on the current tokio runtime.
pub fn start_provider<H>(config: &ProviderConfig, handler: H, duplicate_replies: bool) -> RunningBridge<H>
where
    H: WalletHandler + 'static,
{
    let channels = new_bridge();
    let provider = Arc::new(BtcProvider::new(config, channels.transport));
    let pump = ReplyPump::new(channels.page_inbox, provider.reply_handle());
    let extension = ExtensionLoop::new(channels.extension_requests, channels.extension_replies, handler)
        .with_duplicate_replies(duplicate_replies);
    debug!("Starting bridge tasks");
    RunningBridge { provider, extension: tokio::spawn(extension.run()), pump: tokio::spawn(pump.run()) }
}
