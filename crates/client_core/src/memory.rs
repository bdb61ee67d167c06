use async_trait::async_trait;
use futures::{stream, StreamExt};
use shared::{
    domain::{Todo, TodoId},
    error::ApiError,
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::{
    error::ClientError,
    service::{SnapshotStream, TodoService},
};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Process-local data service. Assigns ids itself and publishes a full
/// snapshot to every observer after each mutation.
pub struct InMemoryTodoService {
    inner: Mutex<InMemoryState>,
    snapshots: broadcast::Sender<Vec<Todo>>,
}

struct InMemoryState {
    next_id: i64,
    todos: Vec<Todo>,
}

impl Default for InMemoryTodoService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoService {
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(InMemoryState {
                next_id: 1,
                todos: Vec::new(),
            }),
            snapshots,
        }
    }

    pub async fn items(&self) -> Vec<Todo> {
        self.inner.lock().await.todos.clone()
    }

    fn publish(&self, todos: &[Todo]) {
        // No observers is fine; the next observer gets its own initial snapshot.
        let _ = self.snapshots.send(todos.to_vec());
    }
}

#[async_trait]
impl TodoService for InMemoryTodoService {
    async fn observe_query(&self) -> Result<SnapshotStream, ClientError> {
        let guard = self.inner.lock().await;
        let rx = self.snapshots.subscribe();
        let initial = guard.todos.clone();
        drop(guard);

        let updates = BroadcastStream::new(rx).map(|delivery| match delivery {
            Ok(items) => Ok(items),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => Err(ClientError::Lagged(skipped)),
        });
        Ok(stream::once(async move { Ok(initial) }).chain(updates).boxed())
    }

    async fn create(&self, content: &str) -> Result<Todo, ClientError> {
        if content.is_empty() {
            return Err(ClientError::api(ApiError::validation(
                "content must not be empty",
            )));
        }
        let mut guard = self.inner.lock().await;
        let todo = Todo::new(TodoId(guard.next_id), content);
        guard.next_id += 1;
        guard.todos.push(todo.clone());
        self.publish(&guard.todos);
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let mut guard = self.inner.lock().await;
        let before = guard.todos.len();
        guard.todos.retain(|todo| todo.id != id);
        if guard.todos.len() == before {
            return Err(ClientError::api(ApiError::not_found(format!(
                "todo {id} not found"
            ))));
        }
        self.publish(&guard.todos);
        Ok(())
    }
}
