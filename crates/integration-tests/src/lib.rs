//! Integration tests for the cafe WiFi directory API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the server
//! docker compose up -d postgres
//! cargo run -p cafe-wifi-server
//!
//! # Run integration tests against it
//! cargo test -p cafe-wifi-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need a live server; the
//! target is configurable via `CAFE_WIFI_URL`.

use reqwest::Client;
use serde_json::{Value, json};

/// Password used for every throwaway test account. Satisfies the server's
/// complexity policy (upper, lower, digit, 8+ chars).
pub const TEST_PASSWORD: &str = "Testpass1";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("CAFE_WIFI_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// A plain HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// A unique email for one test run, so reruns never collide.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@slowcafe.wifi", uuid::Uuid::new_v4().simple())
}

/// Register a throwaway account and return `(token, user)`.
///
/// # Panics
///
/// Panics when the server rejects the signup; tests depend on a clean
/// registration to proceed.
pub async fn signup(client: &Client) -> (String, Value) {
    let resp = client
        .post(format!("{}/api/users/signup", base_url()))
        .json(&json!({"email": unique_email(), "password": TEST_PASSWORD}))
        .send()
        .await
        .expect("Failed to reach signup endpoint");
    assert_eq!(resp.status(), 201, "signup should succeed");

    let body: Value = resp.json().await.expect("signup response is not JSON");
    let token = body["token"]
        .as_str()
        .expect("signup response carries a token")
        .to_string();
    (token, body["user"].clone())
}

/// A unique cafe payload; name and address are randomized so duplicate
/// detection never trips across runs.
#[must_use]
pub fn cafe_payload(tag: &str) -> Value {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    json!({
        "name": format!("{tag} {}", &nonce[..8]),
        "address": format!("{} Integration Way, Test City", &nonce[..6]),
        "contact": 5551234567_i64,
        "description": "Created by the integration suite",
        "amenities": ["wifi"],
    })
}
