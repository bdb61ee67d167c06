use super::*;
use axum::{body, body::Body, http::Request};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tower::ServiceExt;

async fn test_state() -> Arc<AppState> {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    Arc::new(AppState::new(ApiContext { storage }, 32))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn create_request(content: &str) -> Request<Body> {
    Request::post("/todos")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "content": content }).to_string(),
        ))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let app = build_router(test_state().await);
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn create_list_and_delete_round_through_routes() {
    let app = build_router(test_state().await);

    let response = app
        .clone()
        .oneshot(create_request("Buy milk"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Todo = read_json(response).await;
    assert_eq!(created.content, "Buy milk");

    let list = Request::get("/todos").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(list).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let todos: Vec<Todo> = read_json(response).await;
    assert_eq!(todos, vec![created.clone()]);

    let remove = Request::delete(format!("/todos/{}", created.id))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(remove).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remove_again = Request::delete(format!("/todos/{}", created.id))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(remove_again).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn empty_content_is_a_bad_request() {
    let app = build_router(test_state().await);
    let response = app.oneshot(create_request("")).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn mutations_broadcast_full_snapshots() {
    let state = test_state().await;
    let mut events = state.events.subscribe();
    let app = build_router(Arc::clone(&state));

    app.clone()
        .oneshot(create_request("A"))
        .await
        .expect("response");
    app.oneshot(create_request("B")).await.expect("response");

    let ServerEvent::Snapshot { items } = events.recv().await.expect("first") else {
        panic!("expected snapshot");
    };
    assert_eq!(items.len(), 1);
    let ServerEvent::Snapshot { items } = events.recv().await.expect("second") else {
        panic!("expected snapshot");
    };
    let contents: Vec<_> = items.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["A", "B"]);
}

#[tokio::test]
async fn live_query_sends_initial_snapshot_then_updates() {
    let state = test_state().await;
    let app = build_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect");

    let next_snapshot = |msg: WsMessage| -> Vec<Todo> {
        let WsMessage::Text(text) = msg else {
            panic!("expected text frame");
        };
        match serde_json::from_str::<ServerEvent>(&text).expect("event") {
            ServerEvent::Snapshot { items } => items,
            ServerEvent::Error(err) => panic!("unexpected error event: {err}"),
        }
    };

    let initial = ws.next().await.expect("frame").expect("ws");
    assert!(next_snapshot(initial).is_empty());

    create_todo(&state.api, "Buy milk").await.expect("create");
    state.publish_snapshot().await;

    let update = ws.next().await.expect("frame").expect("ws");
    let items = next_snapshot(update);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].content, "Buy milk");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_broadcast_snapshots_in_commit_order() {
    let state = test_state().await;
    let mut events = state.events.subscribe();
    let app = build_router(Arc::clone(&state));

    let creates: Vec<_> = (0..8)
        .map(|n| {
            let app = app.clone();
            tokio::spawn(async move {
                let response = app
                    .oneshot(create_request(&format!("todo {n}")))
                    .await
                    .expect("response");
                assert_eq!(response.status(), StatusCode::CREATED);
            })
        })
        .collect();
    for create in creates {
        create.await.expect("join");
    }

    let mut sizes = Vec::new();
    for _ in 0..8 {
        let ServerEvent::Snapshot { items } = events.recv().await.expect("event") else {
            panic!("expected snapshot");
        };
        sizes.push(items.len());
    }
    assert_eq!(sizes, (1..=8).collect::<Vec<_>>());
}

#[tokio::test]
async fn lagging_live_query_gets_a_fresh_snapshot() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let state = Arc::new(AppState::new(ApiContext { storage }, 1));
    let app = build_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect");
    let WsMessage::Text(initial) = ws.next().await.expect("frame").expect("ws") else {
        panic!("expected text frame");
    };
    assert!(matches!(
        serde_json::from_str::<ServerEvent>(&initial).expect("event"),
        ServerEvent::Snapshot { items } if items.is_empty()
    ));

    for content in ["A", "B", "C"] {
        create_todo(&state.api, content).await.expect("create");
    }
    // On this single-threaded runtime the connection task cannot drain the
    // channel between these sends, so it overflows a capacity of one.
    for _ in 0..3 {
        state
            .events
            .send(ServerEvent::Snapshot { items: Vec::new() })
            .expect("subscriber");
    }

    let WsMessage::Text(next) = ws.next().await.expect("frame").expect("ws") else {
        panic!("expected text frame");
    };
    let ServerEvent::Snapshot { items } = serde_json::from_str(&next).expect("event") else {
        panic!("expected snapshot");
    };
    assert_eq!(items, list_todos(&state.api).await.expect("list"));
    assert_eq!(items.len(), 3);
}
