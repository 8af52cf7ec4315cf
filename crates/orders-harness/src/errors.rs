use orders_client::ClientError;
use thiserror::Error;

/// Failures that abort the whole session before any case runs.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("order store unreachable: {0}")]
    Store(String),

    #[error("failed to start local service: {0}")]
    Service(String),

    #[error("failed to build API client: {0}")]
    Client(#[from] ClientError),
}
