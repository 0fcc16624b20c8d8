use futures::future::join_all;
use futures::{FutureExt, StreamExt};
use libprovider::{
    BtcNetwork, BtcProvider, CorrelationEngine, ProviderConfig, ProviderError, ProviderEvent, RemoteRequest,
    ReplyFrame, ReplyHandle, RequestFrame, Transport,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, OnceLock};

/// Answers every request before `send` returns, the fastest a reply can possibly arrive.
#[derive(Default)]
struct ImmediateTransport {
    replies: OnceLock<ReplyHandle>,
}

impl Transport for ImmediateTransport {
    fn send(&self, frame: RequestFrame) {
        let result = match frame.method.as_str() {
            "requestAccounts" => json!(["bc1qimmediate"]),
            "switchNetwork" => frame.payload["network"].clone(),
            other => json!(format!("{other}-done")),
        };
        let replies = self.replies.get().expect("reply handle installed");
        assert!(replies.deliver(ReplyFrame::success(frame.id, result)));
    }
}

/// Holds every request until the test decides to answer.
#[derive(Default)]
struct HeldTransport {
    held: Mutex<Vec<RequestFrame>>,
}

impl Transport for HeldTransport {
    fn send(&self, frame: RequestFrame) {
        self.held.lock().unwrap().push(frame);
    }
}

impl HeldTransport {
    fn take(&self) -> Vec<RequestFrame> {
        std::mem::take(&mut *self.held.lock().unwrap())
    }
}

#[test]
fn replies_delivered_during_send_are_not_lost() {
    let transport = Arc::new(ImmediateTransport::default());
    let engine = CorrelationEngine::new(Arc::clone(&transport));
    transport.replies.set(engine.reply_handle()).ok();
    let reply = engine.issue(RemoteRequest::SwitchNetwork { network: BtcNetwork::Segnet });
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(reply.now_or_never().unwrap().unwrap(), json!("segnet"));
}

#[tokio::test]
async fn provider_over_an_immediate_transport() {
    let transport = Arc::new(ImmediateTransport::default());
    let provider = BtcProvider::new(&ProviderConfig::default(), Arc::clone(&transport));
    transport.replies.set(provider.reply_handle()).ok();
    let mut events = provider.subscribe();

    assert_eq!(provider.connect().await.unwrap(), vec!["bc1qimmediate".to_string()]);
    assert!(provider.is_connected());
    assert_eq!(provider.switch_network("testnet").await.unwrap(), BtcNetwork::Testnet);
    assert_eq!(provider.push_tx("00").await.unwrap(), json!("pushTx-done"));

    drop(provider);
    let seen = events.collect::<Vec<_>>().await;
    assert_eq!(
        seen,
        vec![
            ProviderEvent::AccountsChanged(vec!["bc1qimmediate".into()]),
            ProviderEvent::Connect,
            ProviderEvent::NetworkChanged(BtcNetwork::Testnet),
        ]
    );
}

#[test]
fn out_of_order_replies_reach_their_own_requests() {
    let engine = CorrelationEngine::new(HeldTransport::default());
    let replies = engine.reply_handle();
    let pending = (0..20)
        .map(|i| engine.issue(RemoteRequest::SignPsbt { psbt_hex: format!("{i:02x}") }))
        .collect::<Vec<_>>();
    let mut frames = engine.transport().take();
    assert_eq!(frames.len(), 20);
    // Answer in reverse, echoing each request's payload
    frames.reverse();
    for frame in &frames {
        replies.deliver(ReplyFrame::success(frame.id, frame.payload["data"].clone()));
    }
    let results = join_all(pending).now_or_never().unwrap();
    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), Value::String(format!("{i:02x}")));
    }
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn mixed_success_and_failure() {
    let engine = CorrelationEngine::new(HeldTransport::default());
    let replies = engine.reply_handle();
    let ok = engine.issue(RemoteRequest::PushPsbt { psbt_hex: "aa".into() });
    let rejected = engine.issue(RemoteRequest::PushPsbt { psbt_hex: "bb".into() });
    replies.deliver(ReplyFrame::failure(rejected.id(), json!({"code": 4001, "message": "User rejected"})));
    replies.deliver(ReplyFrame::success(ok.id(), json!("txid")));
    assert_eq!(ok.now_or_never().unwrap().unwrap(), json!("txid"));
    let err = rejected.now_or_never().unwrap().unwrap_err();
    assert_eq!(err.code(), Some(4001));
    assert!(matches!(err, ProviderError::Remote(_)));
}

#[test]
fn unknown_methods_never_reach_the_transport() {
    let engine = CorrelationEngine::new(HeldTransport::default());
    for name in ["", "pushTx", "signTransaction", "requestaccounts"] {
        let err = engine.issue_named(name, json!({})).err().unwrap();
        assert_eq!(err.code(), Some(4200));
    }
    assert_eq!(engine.pending_count(), 0);
    assert!(engine.transport().take().is_empty());
}
