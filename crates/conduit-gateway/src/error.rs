use conduit_tools::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Tool registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Maximum connections reached (limit: {0})")]
    MaxConnectionsReached(usize),

    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Gateway server error: {0}")]
    ServerError(String),
}
