use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Todo, TodoId},
    error::{ApiError, ErrorCode},
    protocol::{CreateTodoRequest, ServerEvent},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::ClientError,
    service::{SnapshotStream, TodoService},
};

/// Talks to the todo service over HTTP for mutations and a websocket for the
/// live query.
pub struct RemoteTodoService {
    http: Client,
    server_url: String,
}

impl RemoteTodoService {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(server_url)
            .map_err(|_| ClientError::InvalidServerUrl(server_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidServerUrl(server_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn live_query_url(&self) -> String {
        let ws_url = if let Some(rest) = self.server_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.server_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.server_url.clone()
        };
        format!("{ws_url}/ws")
    }

    /// One-shot read of the current list, outside of any live query.
    pub async fn list(&self) -> Result<Vec<Todo>, ClientError> {
        let res = self
            .http
            .get(format!("{}/todos", self.server_url))
            .send()
            .await?;
        Ok(check_status(res).await?.json().await?)
    }
}

async fn check_status(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let fallback = ApiError::new(
        code_for_status(status),
        format!("server responded with {status}"),
    );
    let err = res.json::<ApiError>().await.unwrap_or(fallback);
    Err(ClientError::api(err))
}

/// Used only when an error response carries no `ApiError` body.
fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
        StatusCode::FORBIDDEN => ErrorCode::Forbidden,
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ErrorCode::RateLimited,
        status if status.is_client_error() => ErrorCode::Validation,
        _ => ErrorCode::Internal,
    }
}

fn decode_delivery(text: &str) -> Result<Vec<Todo>, ClientError> {
    match serde_json::from_str::<ServerEvent>(text)? {
        ServerEvent::Snapshot { items } => Ok(items),
        ServerEvent::Error(err) => Err(ClientError::api(err)),
    }
}

#[async_trait]
impl TodoService for RemoteTodoService {
    async fn observe_query(&self) -> Result<SnapshotStream, ClientError> {
        let ws_url = self.live_query_url();
        let (ws_stream, _) = connect_async(&ws_url).await?;
        info!(%ws_url, "live query connected");

        let deliveries = futures::stream::unfold(Some(ws_stream), |state| async move {
            let mut ws = state?;
            loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return Some((decode_delivery(&text), Some(ws)));
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("live query closed by server");
                        return None;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Some((Err(err.into()), None)),
                }
            }
        });
        Ok(deliveries.boxed())
    }

    async fn create(&self, content: &str) -> Result<Todo, ClientError> {
        let res = self
            .http
            .post(format!("{}/todos", self.server_url))
            .json(&CreateTodoRequest {
                content: content.to_string(),
            })
            .send()
            .await?;
        Ok(check_status(res).await?.json().await?)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let res = self
            .http
            .delete(format!("{}/todos/{}", self.server_url, id))
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
