use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bookshelf_kernel::{settings::Settings, InitCtx};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let settings = Settings::default();
    let registry = bookshelf_app::build_registry();
    registry
        .init_modules(&InitCtx {
            settings: &settings,
        })
        .await
        .unwrap();
    bookshelf_http::build_router(&registry, &settings)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn add(app: &Router, title: &str) -> Value {
    let (status, body) = call(
        app,
        "POST",
        "/api/books",
        Some(json!({"title": title, "author": "Anon", "isbn": "000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn books_are_listed_in_insertion_order() {
    let app = app().await;
    for title in ["A", "B", "C"] {
        add(&app, title).await;
    }

    let (status, body) = call(&app, "GET", "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);

    let listed: Vec<(u64, String)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| (b["id"].as_u64().unwrap(), b["title"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(
        listed,
        vec![
            (1, "A".to_string()),
            (2, "B".to_string()),
            (3, "C".to_string())
        ]
    );
}

#[tokio::test]
async fn borrow_and_return_lifecycle() {
    let app = app().await;
    let created = add(&app, "Dune").await;
    assert_eq!(created["borrowed"], false);

    let (status, body) = call(&app, "PUT", "/api/books/1/borrow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["borrowed"], true);

    let (status, _) = call(&app, "PUT", "/api/books/1/borrow", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "PUT", "/api/books/1/return", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["borrowed"], false);

    let (status, _) = call(&app, "PUT", "/api/books/1/return", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/api/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": 1, "title": "Dune", "author": "Anon", "isbn": "000", "borrowed": false})
    );
}

#[tokio::test]
async fn unknown_book_is_not_found_on_every_route() {
    let app = app().await;

    for (method, uri) in [
        ("GET", "/api/books/9999"),
        ("PUT", "/api/books/9999/borrow"),
        ("PUT", "/api/books/9999/return"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"]["code"], "not_found");
        assert!(body["error"]["trace_id"].is_string());
    }
}

#[tokio::test]
async fn missing_title_is_rejected() {
    let app = app().await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/books",
        Some(json!({"author": "Anon", "isbn": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"], json!([{"field": "title", "error": "required"}]));

    let (_, listed) = call(&app, "GET", "/api/books", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/books/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn openapi_document_contains_book_paths() {
    let app = app().await;
    let (status, spec) = call(&app, "GET", "/docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/books"]["post"].is_object());
    assert!(spec["paths"]["/api/books/{id}/return"]["put"].is_object());
    assert!(spec["paths"]["/healthz"]["get"].is_object());
}
