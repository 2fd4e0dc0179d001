//! API integration tests
//!
//! These run against a live server with a reachable database:
//! start the server, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique-ish ISBN per test run so reruns do not trip the duplicate check
fn fresh_isbn(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("978-{}-{}", tag, nanos)
}

async fn create_book(client: &Client, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "My Incredible Life",
            "author": "Edson",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_create_get_and_delete_book() {
    let client = Client::new();
    let isbn = fresh_isbn("100");

    let book = create_book(&client, &isbn).await;
    let book_id = book["id"].as_i64().expect("No book ID");
    assert_eq!(book["title"], "My Incredible Life");
    assert_eq!(book["isbn"], isbn);

    // Read it back
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Delete it
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Gone now
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_empty_fields() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": "", "author": "", "isbn": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"].as_array().expect("No errors array").len(), 3);
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_duplicate_isbn() {
    let client = Client::new();
    let isbn = fresh_isbn("200");

    let book = create_book(&client, &isbn).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Another Title",
            "author": "Another Author",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Isbn already registered.");

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_update_book_keeps_isbn() {
    let client = Client::new();
    let isbn = fresh_isbn("300");

    let book = create_book(&client, &isbn).await;
    let book_id = book["id"].as_i64().expect("No book ID");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({
            "title": "Updated Title",
            "author": "Updated Author",
            "isbn": "should-be-ignored"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Updated Title");
    assert_eq!(body["author"], "Updated Author");
    assert_eq!(body["isbn"], isbn);

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_search_books_by_title() {
    let client = Client::new();
    let isbn = fresh_isbn("400");
    let book = create_book(&client, &isbn).await;

    let response = client
        .get(format!("{}/books?title=incredible&page=1&per_page=10", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].as_i64().unwrap() >= 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);

    // Out-of-range paging parameters are clamped and echoed as applied
    let response = client
        .get(format!("{}/books?page=0&per_page=1000", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 100);

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let isbn = fresh_isbn("500");
    let book = create_book(&client, &isbn).await;

    // Borrow the book
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Edson",
            "customer_email": "edson@example.org"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["id"].as_i64().expect("No loan ID");
    assert!(body["loan_date"].is_string());

    // Cannot borrow it again while out
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Someone Else",
            "customer_email": "someone@example.org"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book already loaned");

    // Loan details embed the book
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["customer"], "Edson");
    assert_eq!(body["book"]["isbn"], isbn);
    assert_eq!(body["returned"], false);

    // Return it
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Returning twice is rejected
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Loan already returned");

    // Once returned the book can be borrowed again
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Someone Else",
            "customer_email": "someone@example.org"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_create_loan_with_unknown_isbn() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": "no-such-isbn",
            "customer": "Edson",
            "customer_email": "edson@example.org"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book not found for entered isbn");
}

#[tokio::test]
#[ignore]
async fn test_search_loans_by_isbn_or_customer() {
    let client = Client::new();
    let isbn = fresh_isbn("600");
    let book = create_book(&client, &isbn).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Loan Searcher",
            "customer_email": "searcher@example.org"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Match by isbn even with a non-matching customer (OR semantics)
    let response = client
        .get(format!(
            "{}/loans?isbn={}&customer=nobody",
            BASE_URL, isbn
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["book"]["isbn"], isbn);

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_list_book_loans() {
    let client = Client::new();
    let isbn = fresh_isbn("700");
    let book = create_book(&client, &isbn).await;
    let book_id = book["id"].as_i64().expect("No book ID");

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Edson",
            "customer_email": "edson@example.org"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/books/{}/loans", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["customer"], "Edson");

    // Unknown book id is a 404, not an empty page
    let response = client
        .get(format!("{}/books/0/loans", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await;
}
