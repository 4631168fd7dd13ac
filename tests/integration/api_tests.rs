//! API integration tests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookstock_server::{
    api::create_router, repository::MemoryBookStore, services::Services, AppState,
};

fn app() -> Router {
    let state = AppState {
        services: Arc::new(Services::new(Arc::new(MemoryBookStore::new()))),
    };
    create_router(state, Duration::from_secs(5))
}

/// Send a request and decode the JSON response body
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("Failed to build request"))
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, value)
}

async fn create_book(app: &Router, title: &str, author: &str, quantity: i32) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/books",
        Some(json!({ "title": title, "author": author, "quantity": quantity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_and_list_books() {
    let app = app();
    create_book(&app, "The Hobbit", "J.R.R. Tolkien", 2).await;
    create_book(&app, "Dune", "Frank Herbert", 1).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().expect("Expected an array");
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["title"], "The Hobbit");
    assert_eq!(books[1]["quantity"], 1);
}

#[tokio::test]
async fn test_create_book_rejects_negative_quantity() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(json!({ "title": "Dune", "author": "Frank Herbert", "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_search_books() {
    let app = app();
    let hobbit = create_book(&app, "The Hobbit", "J.R.R. Tolkien", 2).await;
    create_book(&app, "The Lord of the Rings", "J.R.R. Tolkien", 1).await;
    create_book(&app, "Dune", "Frank Herbert", 0).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books/search?title=THE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/v1/books/search?title=hobbit&author=tolkien",
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], hobbit);

    // id=-1 means "no id filter"
    let (_, body) = send(&app, Method::GET, "/api/v1/books/search?id=-1&author=herbert", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Dune");

    let (status, body) = send(&app, Method::GET, "/api/v1/books/search?id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidIdentifier");
}

#[tokio::test]
async fn test_checkout_and_return_round_trip() {
    let app = app();
    let id = create_book(&app, "The Hobbit", "J.R.R. Tolkien", 3).await;

    let (status, body) = send(&app, Method::PATCH, &format!("/api/v1/checkout?id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["title"], "The Hobbit");

    let (status, body) = send(&app, Method::PATCH, &format!("/api/v1/return?id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 3);

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/books/search?id={}", id), None).await;
    assert_eq!(body[0]["quantity"], 3);
}

#[tokio::test]
async fn test_checkout_out_of_stock() {
    let app = app();
    let id = create_book(&app, "Dune", "Frank Herbert", 1).await;

    let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/checkout?id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::PATCH, &format!("/api/v1/checkout?id={}", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "OutOfStock");

    let (_, body) = send(&app, Method::GET, "/api/v1/books", None).await;
    assert_eq!(body[0]["quantity"], 0);
}

#[tokio::test]
async fn test_stock_errors() {
    let app = app();

    let (status, body) = send(&app, Method::PATCH, "/api/v1/checkout?id=not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidIdentifier");

    let (status, body) = send(&app, Method::PATCH, "/api/v1/return", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidIdentifier");

    let (status, body) = send(&app, Method::PATCH, "/api/v1/return?id=41", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchBook");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/checkout"].is_object());
}
