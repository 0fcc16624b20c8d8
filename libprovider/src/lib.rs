//! In-page Bitcoin wallet provider.
//!
//! A web page and a wallet extension can only talk through asynchronous, unordered, fire-and-forget messages. This
//! crate turns that channel into ordinary async calls.
//!
//! # Architecture
//!
//! ```text
//!  page ──► BtcProvider ──► CorrelationEngine ──► Transport::send(RequestFrame) ──►  wallet
//!             │  session        │ pending set                                        extension
//!             │  EventBus       ▲                                                       │
//!             ▼                 └──────── ReplyHandle::deliver(ReplyFrame) ◄────────────┘
//!        ProviderEvent
//! ```
//!
//! - [`correlation`]: the request/response correlation layer. Every request gets a fresh [`CorrelationId`], its
//!   completion is registered before the frame is sent, and the matching reply settles it exactly once.
//! - [`provider`]: [`BtcProvider`] keeps the current network and address and publishes [`ProviderEvent`]s.
//! - [`method`] and [`request`]: the closed set of remote operations, their wire names and payloads.
//! - [`network`]: the supported networks (`livenet`, `testnet`, `segnet`).
//!
//! The transport itself lives outside this crate; anything implementing [`Transport`] will do, as long as inbound
//! replies are handed to the [`ReplyHandle`].

pub mod config;
pub mod correlation;
pub mod error;
pub mod events;
pub mod frame;
pub mod method;
pub mod network;
pub mod provider;
pub mod request;

pub use config::{BitcoinConfig, ConfigError, ProviderConfig};
pub use correlation::{CorrelationEngine, CorrelationId, PendingReply, PendingRequests, ReplyHandle, Transport};
pub use error::{ProviderError, RemoteError};
pub use events::{EventBus, ProviderEvent};
pub use frame::{ReplyFrame, RequestFrame};
pub use method::RemoteMethod;
pub use network::BtcNetwork;
pub use provider::{BtcProvider, ProviderSession};
pub use request::{RemoteRequest, SignatureScheme};
