use shared::{
    domain::{Todo, TodoId},
    error::ApiError,
    protocol::ServerEvent,
};
use storage::Storage;
use tracing::info;

pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub fn todos_route() -> &'static str {
    "/todos"
}

pub fn live_query_route() -> &'static str {
    "/ws"
}

pub async fn list_todos(ctx: &ApiContext) -> Result<Vec<Todo>, ApiError> {
    ctx.storage.list_todos().await.map_err(internal)
}

/// Full-state event for live query subscribers.
pub async fn snapshot_event(ctx: &ApiContext) -> Result<ServerEvent, ApiError> {
    Ok(ServerEvent::Snapshot {
        items: list_todos(ctx).await?,
    })
}

pub async fn create_todo(ctx: &ApiContext, content: &str) -> Result<Todo, ApiError> {
    validate_content(content)?;
    let todo = ctx.storage.insert_todo(content).await.map_err(internal)?;
    info!(todo_id = todo.id.0, "todo created");
    Ok(todo)
}

pub async fn delete_todo(ctx: &ApiContext, todo_id: TodoId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_todo(todo_id).await.map_err(internal)?;
    if !removed {
        return Err(ApiError::not_found(format!("todo {todo_id} not found")));
    }
    info!(todo_id = todo_id.0, "todo deleted");
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.is_empty() {
        return Err(ApiError::validation("content must not be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::validation(format!(
            "content exceeds {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let ctx = setup().await;
        let err = create_todo(&ctx, "").await.expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(list_todos(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn oversized_content_is_rejected() {
        let ctx = setup().await;
        let content = "x".repeat(MAX_CONTENT_CHARS + 1);
        let err = create_todo(&ctx, &content).await.expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn deleting_unknown_todo_is_not_found() {
        let ctx = setup().await;
        let err = delete_todo(&ctx, TodoId(404))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn snapshot_reflects_every_mutation() {
        let ctx = setup().await;
        let milk = create_todo(&ctx, "Buy milk").await.expect("create");
        create_todo(&ctx, "Walk dog").await.expect("create");
        delete_todo(&ctx, milk.id).await.expect("delete");

        let ServerEvent::Snapshot { items } = snapshot_event(&ctx).await.expect("snapshot") else {
            panic!("expected snapshot event");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "Walk dog");
    }
}
