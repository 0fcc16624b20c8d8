use libprovider::{ConfigError, ProviderError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not load the provider configuration. {0}")]
    Config(#[from] ConfigError),
    #[error("The provider call failed. {0}")]
    Provider(#[from] ProviderError),
    #[error("A bridge task stopped unexpectedly. {0}")]
    Task(#[from] tokio::task::JoinError),
}
