//! The data collaborator seen from the client: a live query plus two mutations.

use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::domain::{Todo, TodoId};

use crate::error::ClientError;

/// Full-snapshot deliveries, including the initial load. The stream ends when
/// the collaborator closes the live query.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Todo>, ClientError>>;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn observe_query(&self) -> Result<SnapshotStream, ClientError>;
    async fn create(&self, content: &str) -> Result<Todo, ClientError>;
    async fn delete(&self, id: TodoId) -> Result<(), ClientError>;
}
