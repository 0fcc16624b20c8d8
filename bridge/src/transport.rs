use crate::codec;
use futures::channel::mpsc;
use libprovider::{RequestFrame, Transport};
use log::*;

/// The page side of the bridge: encodes [`RequestFrame`]s and posts them to the extension.
///
/// Sending never fails from the caller's point of view. Frames that cannot be encoded or delivered are logged and
/// dropped, leaving the request pending.
#[derive(Clone)]
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { outbound }
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl Transport for ChannelTransport {
    fn send(&self, frame: RequestFrame) {
        let text = match codec::encode_request(&frame) {
            Ok(text) => text,
            Err(e) => {
                error!("Could not encode request {}: {e}", frame.id);
                return;
            }
        };
        trace!("Posting {text}");
        if self.outbound.unbounded_send(text).is_err() {
            warn!("The extension is not listening. Request {} ({}) was not delivered", frame.id, frame.method);
        }
    }
}
