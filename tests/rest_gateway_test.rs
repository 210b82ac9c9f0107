/// Drives `RestGateway` against a local axum server that records every
/// request and answers the way PostgREST does.
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;

use murmur::feed::models::{NewComment, NewPost};
use murmur::gateway::{FeedGateway, GatewayError, RestGateway, FEED_SELECT};

const KEY: &str = "anon-test-key";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: String,
}

impl Recorded {
    fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct FakeStore {
    requests: Arc<Mutex<Vec<Recorded>>>,
    broken: bool,
}

impl FakeStore {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(store): State<FakeStore>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let query = url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    store.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query,
        headers,
        body,
    });

    if store.broken {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let table = path.rsplit('/').next().unwrap_or_default();
    match (method, table) {
        (Method::GET, "posts") => Json(json!([
            {
                "id": 2,
                "content": "second",
                "author": "bob",
                "created_at": "2025-01-02T09:00:00+00:00",
                "likes": 3,
                "profile_image_url": null,
                "comments": [
                    {
                        "id": 10,
                        "post_id": 2,
                        "nickname": "carol",
                        "content": "nice",
                        "created_at": "2025-01-02T10:00:00+00:00",
                        "profile_image_url": null
                    }
                ]
            },
            {
                "id": 1,
                "content": "first",
                "author": "alice",
                "created_at": "2025-01-01T09:00:00+00:00",
                "likes": 0,
                "profile_image_url": "data:image/png;base64,AA==",
                "comments": []
            }
        ]))
        .into_response(),
        (Method::POST, "posts") => (
            StatusCode::CREATED,
            Json(json!([{
                "id": 3,
                "content": "hello",
                "author": "dave",
                "created_at": "2025-01-03T09:00:00+00:00",
                "likes": 0,
                "profile_image_url": null
            }])),
        )
            .into_response(),
        (Method::POST, "comments") => (
            StatusCode::CREATED,
            Json(json!([{
                "id": 99,
                "post_id": 2,
                "nickname": "Bob",
                "content": "hi",
                "created_at": "2025-01-03T10:00:00+00:00",
                "profile_image_url": null
            }])),
        )
            .into_response(),
        (Method::PATCH, "posts") => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the fake store; returns its base URL.
async fn spawn_fake(store: FakeStore) -> String {
    let app = Router::new().fallback(handle).with_state(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn assert_authorized(request: &Recorded) {
    assert_eq!(request.header("apikey"), Some(KEY));
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {}", KEY).as_str())
    );
}

#[tokio::test]
async fn select_feed_requests_joined_and_ordered_rows() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    let gateway = RestGateway::new(&base, KEY, None).unwrap();

    let rows = gateway.select_feed().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 2);
    assert_eq!(rows[0].likes, 3);
    assert_eq!(rows[0].comments.as_ref().map(Vec::len), Some(1));
    assert_eq!(
        rows[1].profile_image_url.as_deref(),
        Some("data:image/png;base64,AA==")
    );

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/rest/v1/posts");
    assert_eq!(request.query_value("select"), Some(FEED_SELECT));
    assert_eq!(request.query_value("order"), Some("created_at.desc"));
    assert_eq!(request.query_value("comments.order"), Some("created_at.asc"));
    assert_authorized(request);
}

#[tokio::test]
async fn insert_post_asks_for_the_stored_row() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    let gateway = RestGateway::new(&base, KEY, None).unwrap();

    let rows = gateway
        .insert_post(&NewPost {
            content: "hello".into(),
            author: "dave".into(),
            profile_image_url: None,
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 3);

    let request = &store.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/rest/v1/posts");
    assert_eq!(request.header("prefer"), Some("return=representation"));
    assert_authorized(request);

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        json!([{ "content": "hello", "author": "dave", "profile_image_url": null }])
    );
}

#[tokio::test]
async fn insert_comment_returns_server_assigned_fields() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    let gateway = RestGateway::new(&base, KEY, None).unwrap();

    let row = gateway
        .insert_comment(&NewComment {
            post_id: 2,
            nickname: "Bob".into(),
            content: "hi".into(),
        })
        .await
        .unwrap();

    assert_eq!(row.id, 99);
    assert_eq!(row.created_at, "2025-01-03T10:00:00+00:00");

    let request = &store.requests()[0];
    assert_eq!(request.path, "/rest/v1/comments");
    assert_eq!(request.header("prefer"), Some("return=representation"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({ "post_id": 2, "nickname": "Bob", "content": "hi" }));
}

#[tokio::test]
async fn update_likes_patches_one_row() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    let gateway = RestGateway::new(&base, KEY, None).unwrap();

    gateway.update_likes(1, 6).await.unwrap();

    let request = &store.requests()[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/rest/v1/posts");
    assert_eq!(request.query_value("id"), Some("eq.1"));
    assert_authorized(request);
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({ "likes": 6 }));
}

#[tokio::test]
async fn base_url_path_is_kept() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    let gateway = RestGateway::new(&format!("{}/project", base), KEY, None).unwrap();

    gateway.select_feed().await.unwrap();

    assert_eq!(store.requests()[0].path, "/project/rest/v1/posts");
}

#[tokio::test]
async fn error_status_carries_the_body() {
    let store = FakeStore {
        broken: true,
        ..FakeStore::default()
    };
    let base = spawn_fake(store.clone()).await;
    let gateway = RestGateway::new(&base, KEY, None).unwrap();

    let err = gateway.update_likes(1, 6).await.unwrap_err();

    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_store_is_an_http_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = RestGateway::new(&format!("http://{}", addr), KEY, None).unwrap();
    let err = gateway.select_feed().await.unwrap_err();

    assert!(matches!(err, GatewayError::Http(_)));
}
