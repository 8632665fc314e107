//! Router tests that run without a database
//!
//! Every request here is rejected before any query is issued, so the pool
//! is created lazily and never actually connects.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use biblioteca_server::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

fn app() -> Router {
    let config = AppConfig::defaults().expect("embedded defaults");
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy(&config.database.url)
        .expect("lazy pool");

    let services = Services::new(Repository::new(pool), config.loans.clone());
    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn assert_bad_value(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
    assert_eq!(body["code"], 18);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_book_with_malformed_isbn() {
    let (status, body) = send(
        Method::POST,
        "/api/books",
        Some(json!({
            "title": "Dom Casmurro",
            "author": "Machado de Assis",
            "isbn": "9788535910"
        })),
    )
    .await;
    assert_bad_value(status, &body);
    assert!(body["message"].as_str().unwrap().contains("ISBN"));
}

#[tokio::test]
async fn test_create_book_without_title() {
    let (status, body) = send(
        Method::POST,
        "/api/books",
        Some(json!({
            "author": "Machado de Assis",
            "isbn": "978-8535910663"
        })),
    )
    .await;
    assert_bad_value(status, &body);
    assert!(body["message"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_create_book_with_overlong_title() {
    let (status, body) = send(
        Method::POST,
        "/api/books",
        Some(json!({
            "title": "x".repeat(300),
            "author": "Machado de Assis",
            "isbn": "978-8535910663"
        })),
    )
    .await;
    assert_bad_value(status, &body);
    assert!(body["message"].as_str().unwrap().contains("255"));
}

#[tokio::test]
async fn test_update_book_with_overlong_author() {
    let (status, body) = send(
        Method::PUT,
        "/api/books/1",
        Some(json!({
            "title": "Dom Casmurro",
            "author": "a".repeat(256),
            "isbn": "978-8535910663"
        })),
    )
    .await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_customer_born_in_the_future() {
    let (status, body) = send(
        Method::POST,
        "/api/customers",
        Some(json!({
            "name": "Maria",
            "lastname": "Silva",
            "address": "Rua das Flores 10",
            "city": "Recife",
            "state": "pe",
            "country": "Brasil",
            "birth_date": "2999-01-01"
        })),
    )
    .await;
    assert_bad_value(status, &body);
    assert!(body["message"].as_str().unwrap().contains("future"));
}

#[tokio::test]
async fn test_create_customer_with_bad_state() {
    let (status, body) = send(
        Method::POST,
        "/api/customers",
        Some(json!({
            "name": "Maria",
            "lastname": "Silva",
            "address": "Rua das Flores 10",
            "city": "Recife",
            "state": "PER",
            "country": "Brasil",
            "birth_date": "1990-05-17"
        })),
    )
    .await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_create_customer_with_padded_short_fields() {
    let (status, body) = send(
        Method::POST,
        "/api/customers",
        Some(json!({
            "name": "Jo ",
            "lastname": "Silva",
            "address": "Rua das Flores 10",
            "city": "Recife",
            "state": "p ",
            "country": "Brasil",
            "birth_date": "1990-05-17"
        })),
    )
    .await;
    assert_bad_value(status, &body);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Name"));
    assert!(message.contains("State"));
}

#[tokio::test]
async fn test_create_loan_without_books() {
    let (status, body) = send(
        Method::POST,
        "/api/loans",
        Some(json!({
            "customer_id": 1,
            "book_ids": [],
            "loan_date": "2024-03-01"
        })),
    )
    .await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_create_loan_with_too_many_books() {
    let (status, body) = send(
        Method::POST,
        "/api/loans",
        Some(json!({
            "customer_id": 1,
            "book_ids": [1, 2, 3],
            "loan_date": "2024-03-01"
        })),
    )
    .await;
    assert_bad_value(status, &body);
    assert!(body["message"].as_str().unwrap().contains("more than 2"));
}

#[tokio::test]
async fn test_create_loan_in_the_future() {
    let (status, body) = send(
        Method::POST,
        "/api/loans",
        Some(json!({
            "customer_id": 1,
            "book_ids": [1],
            "loan_date": "2999-03-01"
        })),
    )
    .await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_loans_by_inverted_date_range() {
    let (status, body) = send(
        Method::GET,
        "/api/loans/date?start_date=2024-03-10&end_date=2024-03-01",
        None,
    )
    .await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_loans_by_malformed_date() {
    let (status, body) = send(
        Method::GET,
        "/api/loans/date?start_date=yesterday&end_date=2024-03-01",
        None,
    )
    .await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_customers_by_malformed_birth_date() {
    let (status, body) = send(Method::GET, "/api/customers/birthdate/17-05-1990", None).await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_unknown_book_status() {
    let (status, body) = send(Method::PATCH, "/api/books/1/status?status=lost", None).await;
    assert_bad_value(status, &body);
    assert!(body["message"].as_str().unwrap().contains("AVAILABLE"));
}

#[tokio::test]
async fn test_missing_customer_status() {
    let (status, body) = send(Method::PATCH, "/api/customers/1/status", None).await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_non_numeric_id() {
    let (status, body) = send(Method::GET, "/api/books/abc", None).await;
    assert_bad_value(status, &body);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(Method::GET, "/api/authors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
