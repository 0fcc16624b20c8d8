use crate::codec;
use futures::channel::mpsc;
use futures::StreamExt;
use libprovider::ReplyHandle;
use log::*;

/// Inbound delivery: reads reply messages from the extension and routes each one to its pending request.
pub struct ReplyPump {
    inbound: mpsc::UnboundedReceiver<String>,
    replies: ReplyHandle,
}

impl ReplyPump {
    pub fn new(inbound: mpsc::UnboundedReceiver<String>, replies: ReplyHandle) -> Self {
        Self { inbound, replies }
    }

    /// Runs until the extension side closes the channel. Returns the number of replies that settled a request.
    pub async fn run(mut self) -> usize {
        let mut settled = 0;
        while let Some(text) = self.inbound.next().await {
            match codec::decode_reply(&text) {
                Ok(frame) => {
                    if self.replies.deliver(frame) {
                        settled += 1;
                    }
                }
                Err(e) => warn!("Skipping undecodable reply {text:?}. {e}"),
            }
        }
        debug!("Reply pump stopped after settling {settled} requests");
        settled
    }
}
