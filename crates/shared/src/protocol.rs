use serde::{Deserialize, Serialize};

use crate::{domain::Todo, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub content: String,
}

/// Events pushed over the live query socket.
///
/// Every `Snapshot` carries the complete ordered item set; receivers replace
/// their state with it rather than patching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    Snapshot { items: Vec<Todo> },
    Error(ApiError),
}
