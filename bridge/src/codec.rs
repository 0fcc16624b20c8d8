//! JSON text encoding of the frames that cross the page/extension boundary.

use crate::errors::BridgeError;
use libprovider::{ReplyFrame, RequestFrame};

pub fn encode_request(frame: &RequestFrame) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(frame)?)
}

pub fn decode_request(text: &str) -> Result<RequestFrame, BridgeError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_reply(frame: &ReplyFrame) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(frame)?)
}

pub fn decode_reply(text: &str) -> Result<ReplyFrame, BridgeError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use libprovider::CorrelationId;
    use serde_json::json;

    #[test]
    fn decodes_extension_replies() {
        let frame = decode_reply(r#"{"id":8,"result":["bc1q"]}"#).unwrap();
        assert_eq!(frame, ReplyFrame::success(CorrelationId::from(8), json!(["bc1q"])));
        let frame = decode_reply(r#"{"id":8,"error":{"code":4001,"message":"no"},"result":null}"#).unwrap();
        assert_eq!(frame.into_result().unwrap_err().code(), Some(4001));
    }

    #[test]
    fn success_replies_omit_the_error_field() {
        let text = encode_reply(&ReplyFrame::success(CorrelationId::from(3), json!("segnet"))).unwrap();
        assert_eq!(text, r#"{"id":3,"result":"segnet"}"#);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_reply("not json"), Err(BridgeError::Codec(_))));
        assert!(matches!(decode_request(r#"{"id":"x","method":"pushTx"}"#), Err(BridgeError::Codec(_))));
    }
}
