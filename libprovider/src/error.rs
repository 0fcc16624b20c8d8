use crate::correlation::CorrelationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Provider error code for a method the provider does not support, as used by in-page wallet providers.
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unsupported network '{network}'. Supported networks are: {supported}")]
    UnsupportedNetwork { network: String, supported: String },
    #[error("Invalid params. {0}")]
    InvalidParams(String),
    #[error("The wallet does not support calling '{method}' yet.")]
    UnsupportedMethod { method: String },
    #[error("The wallet rejected the request. {0}")]
    Remote(RemoteError),
    #[error("No reply for request {id} arrived in time. The request was abandoned.")]
    Timeout { id: CorrelationId },
    #[error("The request was dropped before a reply arrived.")]
    ChannelClosed,
    #[error("The wallet returned an unexpected reply. {0}")]
    UnexpectedReply(String),
    #[error("Could not (de)serialize a provider message. {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// The numeric provider error code, for errors that have one.
    ///
    /// Remote errors report whatever `code` field the wallet put in its error payload.
    pub fn code(&self) -> Option<i64> {
        match self {
            ProviderError::UnsupportedMethod { .. } => Some(UNSUPPORTED_METHOD_CODE),
            ProviderError::Remote(e) => e.code(),
            _ => None,
        }
    }

    /// True for errors raised locally before anything was sent to the wallet.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ProviderError::UnsupportedNetwork { .. }
                | ProviderError::InvalidParams(_)
                | ProviderError::UnsupportedMethod { .. }
        )
    }
}

/// An error payload sent back by the wallet extension.
///
/// The payload is kept exactly as it arrived; this layer never inspects or rewrites remote failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteError(pub Value);

impl RemoteError {
    pub fn new(payload: impl Into<Value>) -> Self {
        Self(payload.into())
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn code(&self) -> Option<i64> {
        self.0.get("code").and_then(Value::as_i64)
    }

    /// True for payloads the wallet uses to signal "no error": `null`, `false`, `0` and the empty string.
    pub fn is_falsy(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(_) | Value::Object(_) => false,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            Value::Object(map) => match map.get("message").and_then(Value::as_str) {
                Some(msg) => f.write_str(msg),
                None => write!(f, "{}", self.0),
            },
            other => write!(f, "{other}"),
        }
    }
}
