use shared::error::{ApiError, ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{0}': must start with http:// or https://")]
    InvalidServerUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket failed: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid server event: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiException),
    #[error("live query lagged; {0} snapshots were skipped")]
    Lagged(u64),
}

impl ClientError {
    pub fn api(err: ApiError) -> Self {
        Self::Api(err.into())
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api(err) => Some(err.code),
            _ => None,
        }
    }
}
