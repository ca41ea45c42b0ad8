use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("failed to connect websocket {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("websocket receive failed: {0}")]
    Receive(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
