use crate::network::BtcNetwork;
use futures::channel::mpsc;
use log::trace;
use std::sync::{Mutex, PoisonError};

/// Notifications published by the provider to any number of observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Connect,
    Disconnect,
    AccountsChanged(Vec<String>),
    NetworkChanged(BtcNetwork),
}

impl ProviderEvent {
    /// The event name pages subscribe to.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::Connect => "connect",
            ProviderEvent::Disconnect => "disconnect",
            ProviderEvent::AccountsChanged(_) => "accountsChanged",
            ProviderEvent::NetworkChanged(_) => "networkChanged",
        }
    }
}

/// Fan-out of [`ProviderEvent`]s over unbounded channels. Observers that have gone away are pruned on publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner).push(sender);
        receiver
    }

    pub fn publish(&self, event: ProviderEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        trace!("Publishing {} to {} observers", event.name(), subscribers.len());
        subscribers.retain(|s| s.unbounded_send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
