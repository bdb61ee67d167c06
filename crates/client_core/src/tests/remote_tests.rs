use super::*;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket, WebSocketUpgrade},
        Path,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use shared::error::ErrorCode;
use tokio::net::TcpListener;

async fn http_create(Json(req): Json<CreateTodoRequest>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(Todo::new(TodoId(1), req.content)))
}

async fn http_list() -> Json<Vec<Todo>> {
    Json(vec![Todo::new(TodoId(1), "A")])
}

async fn http_delete(Path(todo_id): Path<i64>) -> axum::response::Response {
    if todo_id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found("todo 404 not found")),
        )
            .into_response();
    }
    match todo_id {
        401 => StatusCode::UNAUTHORIZED.into_response(),
        403 => StatusCode::FORBIDDEN.into_response(),
        413 => StatusCode::PAYLOAD_TOO_LARGE.into_response(),
        429 => StatusCode::TOO_MANY_REQUESTS.into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn ws_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(scripted_live_query)
}

async fn scripted_live_query(mut socket: WebSocket) {
    let frames = [
        serde_json::to_string(&ServerEvent::Snapshot {
            items: vec![Todo::new(TodoId(1), "A")],
        })
        .expect("json"),
        serde_json::to_string(&ServerEvent::Error(ApiError::internal("storage down")))
            .expect("json"),
        "not json".to_string(),
        serde_json::to_string(&ServerEvent::Snapshot { items: Vec::new() }).expect("json"),
    ];
    for frame in frames {
        if socket.send(AxumMessage::Text(frame)).await.is_err() {
            return;
        }
    }
    let _ = socket.send(AxumMessage::Close(None)).await;
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/todos", get(http_list).post(http_create))
        .route("/todos/:todo_id", delete(http_delete))
        .route("/ws", get(ws_handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/")
}

#[test]
fn rejects_non_http_server_urls() {
    assert!(matches!(
        RemoteTodoService::new("ftp://example.com"),
        Err(ClientError::InvalidServerUrl(_))
    ));
    assert!(matches!(
        RemoteTodoService::new("not a url"),
        Err(ClientError::InvalidServerUrl(_))
    ));
}

#[test]
fn derives_websocket_url_from_server_url() {
    let plain = RemoteTodoService::new("http://127.0.0.1:8443/").expect("service");
    assert_eq!(plain.server_url(), "http://127.0.0.1:8443");
    assert_eq!(plain.live_query_url(), "ws://127.0.0.1:8443/ws");

    let tls = RemoteTodoService::new("https://todos.example.com").expect("service");
    assert_eq!(tls.live_query_url(), "wss://todos.example.com/ws");
}

#[tokio::test]
async fn create_list_and_delete_map_http_responses() {
    let service = RemoteTodoService::new(&spawn_server().await).expect("service");

    let created = service.create("Buy milk").await.expect("create");
    assert_eq!(created.content, "Buy milk");
    assert_eq!(service.list().await.expect("list").len(), 1);

    service.delete(TodoId(1)).await.expect("delete");
    let err = service.delete(TodoId(404)).await.expect_err("missing");
    assert_eq!(err.code(), Some(ErrorCode::NotFound));
}

#[tokio::test]
async fn bodiless_error_responses_map_from_status() {
    let server_url = spawn_server().await;
    let service = RemoteTodoService::new(&server_url).expect("service");

    for (id, code) in [
        (401, ErrorCode::Unauthorized),
        (403, ErrorCode::Forbidden),
        (413, ErrorCode::Validation),
        (429, ErrorCode::RateLimited),
    ] {
        let err = service.delete(TodoId(id)).await.expect_err("error status");
        assert_eq!(err.code(), Some(code), "status for id {id}");
    }

    // A path the server does not route at all.
    let misrouted = RemoteTodoService::new(&format!("{server_url}missing")).expect("service");
    let err = misrouted.list().await.expect_err("no such route");
    assert_eq!(err.code(), Some(ErrorCode::NotFound));
}

#[tokio::test]
async fn live_query_surfaces_snapshots_and_delivery_errors_until_close() {
    let service = RemoteTodoService::new(&spawn_server().await).expect("service");
    let deliveries: Vec<_> = service
        .observe_query()
        .await
        .expect("observe")
        .collect()
        .await;

    assert_eq!(deliveries.len(), 4);
    assert_eq!(deliveries[0].as_ref().expect("snapshot").len(), 1);
    assert!(matches!(
        &deliveries[1],
        Err(err) if err.code() == Some(ErrorCode::Internal)
    ));
    assert!(matches!(&deliveries[2], Err(ClientError::Decode(_))));
    assert!(deliveries[3].as_ref().expect("snapshot").is_empty());
}
