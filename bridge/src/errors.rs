use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Could not encode or decode a bridge frame. {0}")]
    Codec(#[from] serde_json::Error),
    #[error("The other side of the bridge has gone away.")]
    Disconnected,
}
