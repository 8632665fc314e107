//! API integration tests
//!
//! These run against a live server backed by a migrated database.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// ISBNs are unique in the catalog, so derive one from the current time
fn unique_isbn() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("978-{:010}", nanos % 10_000_000_000)
}

async fn create_book(client: &Client, title: &str) -> Value {
    create_book_with_isbn(client, title, &unique_isbn()).await
}

async fn create_book_with_isbn(client: &Client, title: &str, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": "Clarice Lispector",
            "isbn": isbn,
            "published_date": "1977-10-26"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn create_customer(client: &Client) -> Value {
    let response = client
        .post(format!("{}/customers", BASE_URL))
        .json(&json!({
            "name": "Joana",
            "lastname": "Pereira",
            "address": "Avenida Boa Viagem 300",
            "city": "Recife",
            "state": "pe",
            "country": "Brasil",
            "birth_date": "1988-02-29"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn create_loan(client: &Client, customer_id: i64, book_ids: &[i64]) -> Value {
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "customer_id": customer_id,
            "book_ids": book_ids,
            "loan_date": "2024-03-01"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn get_json(client: &Client, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let (status, body) = get_json(&client, "/health").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&client, "/ready").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();

    let book = create_book(&client, "A Hora da Estrela").await;
    let id = book["id"].as_i64().unwrap();
    assert_eq!(book["status"], "AVAILABLE");

    let (status, body) = get_json(&client, &format!("/books/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "A Hora da Estrela");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .json(&json!({
            "title": "A Hora da Estrela (2a ed.)",
            "author": "Clarice Lispector",
            "isbn": book["isbn"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "A Hora da Estrela (2a ed.)");
    assert_eq!(body["status"], "AVAILABLE");
    assert!(body["published_date"].is_null());

    let (status, body) = get_json(&client, "/books?title=hora%20da").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().any(|b| b["id"] == id));

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, body) = get_json(&client, &format!("/books/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();

    let book = create_book(&client, "Perto do Coracao Selvagem").await;
    let book_id = book["id"].as_i64().unwrap();
    let customer = create_customer(&client).await;
    let customer_id = customer["id"].as_i64().unwrap();
    assert_eq!(customer["state"], "PE");
    assert_eq!(customer["status"], "ACTIVE");

    let loan = create_loan(&client, customer_id, &[book_id]).await;
    let loan_id = loan["id"].as_i64().unwrap();
    assert_eq!(loan["status"], "ACTIVE");
    assert_eq!(loan["return_date"], "2024-03-15");
    assert_eq!(loan["books"][0]["status"], "BORROWED");

    // A borrowed book cannot be lent twice or deleted
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "customer_id": customer_id,
            "book_ids": [book_id],
            "loan_date": "2024-03-02"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Customers with open loans cannot be deleted
    let response = client
        .delete(format!("{}/customers/{}", BASE_URL, customer_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 21);

    // Extending before the loan date is refused
    let response = client
        .patch(format!("{}/loans/{}", BASE_URL, loan_id))
        .json(&json!({ "return_date": "2024-02-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .patch(format!("{}/loans/{}", BASE_URL, loan_id))
        .json(&json!({ "return_date": "2024-03-30" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["return_date"], "2024-03-30");

    let (status, body) = get_json(&client, &format!("/customers/{}/loans", customer_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Finishing releases the books
    let response = client
        .put(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "RETURNED");

    let (_, body) = get_json(&client, &format!("/books/{}", book_id)).await;
    assert_eq!(body["status"], "AVAILABLE");

    let response = client
        .put(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&client, "/loans/date?start_date=2024-03-01&end_date=2024-03-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().any(|l| l["id"] == loan_id));

    let response = client
        .delete(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/customers/{}", BASE_URL, customer_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_loan_with_unknown_customer() {
    let client = Client::new();
    let book = create_book(&client, "Agua Viva").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "customer_id": i64::MAX,
            "book_ids": [book["id"]],
            "loan_date": "2024-03-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The failed loan must not leave the book borrowed
    let (_, body) = get_json(&client, &format!("/books/{}", book["id"])).await;
    assert_eq!(body["status"], "AVAILABLE");
}

#[tokio::test]
#[ignore]
async fn test_customer_name_search_without_match() {
    let client = Client::new();
    let (status, body) = get_json(&client, "/customers?name=Nobody%20Here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5);
}

#[tokio::test]
#[ignore]
async fn test_deleting_active_loan_releases_books() {
    let client = Client::new();
    let first = create_book(&client, "Laços de Família").await;
    let second = create_book(&client, "A Paixão Segundo G.H.").await;
    let book_ids = [first["id"].as_i64().unwrap(), second["id"].as_i64().unwrap()];
    let customer = create_customer(&client).await;

    let loan = create_loan(&client, customer["id"].as_i64().unwrap(), &book_ids).await;
    assert_eq!(loan["status"], "ACTIVE");

    let response = client
        .delete(format!("{}/loans/{}", BASE_URL, loan["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for id in book_ids {
        let (_, body) = get_json(&client, &format!("/books/{}", id)).await;
        assert_eq!(body["status"], "AVAILABLE");
    }

    let (status, _) = get_json(&client, &format!("/loans/{}", loan["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_available_book_in_open_loan_cannot_be_deleted() {
    let client = Client::new();
    let book = create_book(&client, "Uma Aprendizagem").await;
    let book_id = book["id"].as_i64().unwrap();
    let customer = create_customer(&client).await;
    create_loan(&client, customer["id"].as_i64().unwrap(), &[book_id]).await;

    // Override the status while the loan is still open
    let response = client
        .patch(format!("{}/books/{}/status?status=available", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "AVAILABLE");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 21);

    let (status, _) = get_json(&client, &format!("/books/{}", book_id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_rejected() {
    let client = Client::new();
    let isbn = unique_isbn();
    create_book_with_isbn(&client, "O Lustre", &isbn).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "O Lustre (copia)",
            "author": "Clarice Lispector",
            "isbn": isbn
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 18);
    assert!(body["message"].as_str().unwrap().contains(&isbn));
}

#[tokio::test]
#[ignore]
async fn test_title_search_matches_wildcards_literally() {
    let client = Client::new();
    let literal = create_book(&client, "Rate 100% Certain").await;
    let other = create_book(&client, "Rate 1000 Certain").await;

    let (status, body) = get_json(&client, "/books?title=100%25").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&Value> = body.as_array().unwrap().iter().map(|b| &b["id"]).collect();
    assert!(ids.contains(&&literal["id"]));
    assert!(!ids.contains(&&other["id"]));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_customer_delete_and_loan() {
    let client = Client::new();

    for _ in 0..10 {
        let book = create_book(&client, "A Cidade Sitiada").await;
        let book_id = book["id"].as_i64().unwrap();
        let customer = create_customer(&client).await;
        let customer_id = customer["id"].as_i64().unwrap();

        let delete = client
            .delete(format!("{}/customers/{}", BASE_URL, customer_id))
            .send();
        let loan = client
            .post(format!("{}/loans", BASE_URL))
            .json(&json!({
                "customer_id": customer_id,
                "book_ids": [book_id],
                "loan_date": "2024-03-01"
            }))
            .send();
        let (delete, loan) = tokio::join!(delete, loan);
        let deleted = delete.unwrap().status() == StatusCode::NO_CONTENT;
        let loaned = loan.unwrap().status() == StatusCode::CREATED;

        // Exactly one of them wins, and the book status agrees with the outcome
        assert_ne!(deleted, loaned);
        let (_, body) = get_json(&client, &format!("/books/{}", book_id)).await;
        let expected = if loaned { "BORROWED" } else { "AVAILABLE" };
        assert_eq!(body["status"], expected);
    }
}
