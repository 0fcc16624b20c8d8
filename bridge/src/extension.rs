//! The extension side of the bridge.
//!
//! [`ExtensionLoop`] stands in for the wallet extension's message listener: it decodes each request, hands it to a
//! [`WalletHandler`] and posts the reply back under the same correlation id.

use crate::codec;
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use libprovider::{ReplyFrame, RequestFrame};
use log::*;
use serde_json::Value;

/// What the wallet does with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    Reply(Value),
    Reject(Value),
    /// Never answer. The page-side request stays pending.
    NoReply,
}

/// Wallet-side logic behind the bridge. `method` is the wire name.
#[async_trait]
pub trait WalletHandler: Send {
    async fn handle(&mut self, method: &str, payload: Value) -> HandlerOutcome;
}

pub struct ExtensionLoop<H> {
    requests: mpsc::UnboundedReceiver<String>,
    replies: mpsc::UnboundedSender<String>,
    handler: H,
    duplicate_replies: bool,
}

impl<H: WalletHandler> ExtensionLoop<H> {
    pub fn new(requests: mpsc::UnboundedReceiver<String>, replies: mpsc::UnboundedSender<String>, handler: H) -> Self {
        Self { requests, replies, handler, duplicate_replies: false }
    }

    /// Post every reply twice, like a flaky messaging layer would.
    pub fn with_duplicate_replies(mut self, duplicate: bool) -> Self {
        self.duplicate_replies = duplicate;
        self
    }

    /// Runs until the page side closes the channel, then hands the handler back.
    pub async fn run(mut self) -> H {
        while let Some(text) = self.requests.next().await {
            let frame = match codec::decode_request(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Extension: skipping undecodable request {text:?}. {e}");
                    continue;
                }
            };
            let RequestFrame { id, method, payload } = frame;
            trace!("Extension: handling {method} for request {id}");
            let reply = match self.handler.handle(&method, payload).await {
                HandlerOutcome::Reply(result) => ReplyFrame::success(id, result),
                HandlerOutcome::Reject(error) => ReplyFrame::failure(id, error),
                HandlerOutcome::NoReply => {
                    debug!("Extension: leaving request {id} ({method}) unanswered");
                    continue;
                }
            };
            if let Err(e) = self.post(&reply) {
                warn!("Extension: could not reply to request {id}. {e}");
                break;
            }
            if self.duplicate_replies {
                self.post(&reply).ok();
            }
        }
        debug!("Extension loop stopped");
        self.handler
    }

    fn post(&self, reply: &ReplyFrame) -> Result<(), crate::BridgeError> {
        let text = codec::encode_reply(reply)?;
        self.replies.unbounded_send(text).map_err(|_| crate::BridgeError::Disconnected)
    }
}
