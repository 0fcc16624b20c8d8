//! Messages exchanged with the wallet extension.

use crate::correlation::CorrelationId;
use crate::error::RemoteError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An outbound request. `method` is the wire name of the remote operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: CorrelationId,
    pub method: String,
    pub payload: Value,
}

impl RequestFrame {
    pub fn new(id: CorrelationId, method: impl Into<String>, payload: Value) -> Self {
        Self { id, method: method.into(), payload }
    }
}

/// An inbound reply. A missing or falsy `error` (`null`, `false`, `0`, `""`) means the request succeeded with
/// `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyFrame {
    pub id: CorrelationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
    #[serde(default)]
    pub result: Value,
}

impl ReplyFrame {
    pub fn success(id: CorrelationId, result: Value) -> Self {
        Self { id, error: None, result }
    }

    pub fn failure(id: CorrelationId, error: impl Into<Value>) -> Self {
        Self { id, error: Some(RemoteError::new(error)), result: Value::Null }
    }

    pub fn into_result(self) -> Result<Value, RemoteError> {
        match self.error.filter(|e| !e.is_falsy()) {
            Some(e) => Err(e),
            None => Ok(self.result),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_error_means_success() {
        let frame: ReplyFrame = serde_json::from_value(json!({"id": 7, "error": null, "result": "livenet"})).unwrap();
        assert_eq!(frame.id, CorrelationId::from(7));
        assert_eq!(frame.into_result().unwrap(), json!("livenet"));
    }

    #[test]
    fn falsy_errors_mean_success() {
        for error in [json!(false), json!(""), json!(0)] {
            let frame: ReplyFrame =
                serde_json::from_value(json!({"id": 3, "error": error, "result": "testnet"})).unwrap();
            assert_eq!(frame.into_result().unwrap(), json!("testnet"));
        }
        let frame: ReplyFrame = serde_json::from_value(json!({"id": 3, "error": {}, "result": "testnet"})).unwrap();
        assert_eq!(frame.into_result().unwrap_err(), RemoteError::new(json!({})));
    }

    #[test]
    fn reply_without_result_field() {
        let frame: ReplyFrame = serde_json::from_value(json!({"id": 9, "error": "denied"})).unwrap();
        assert_eq!(frame.into_result().unwrap_err(), RemoteError::new("denied"));
    }

    #[test]
    fn request_frame_wire_shape() {
        let frame = RequestFrame::new(CorrelationId::from(42), "pushTx", json!({"data": "00ff"}));
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, json!({"id": 42, "method": "pushTx", "payload": {"data": "00ff"}}));
    }
}
