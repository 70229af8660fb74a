//! Integration tests for the speed-test runner endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The server running (cargo run -p cafe-wifi-server)
//!
//! Without `SPEEDTEST_TOKEN` configured the server simulates measurements,
//! which is exactly what these tests want: deterministic availability.
//!
//! Run with: cargo test -p cafe-wifi-integration-tests -- --ignored

use cafe_wifi_integration_tests::{base_url, cafe_payload, client, signup};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires a running cafe-wifi-server and database"]
async fn test_quick_test_returns_annotated_results() {
    let client = client();

    let resp = client
        .get(format!("{}/api/speedtest/quick", base_url()))
        .send()
        .await
        .expect("Failed to run quick test");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read results");
    let results = &body["results"];
    assert!(results["download"].as_f64().expect("download is numeric") > 0.0);
    assert!(results["ping"].as_f64().expect("ping is numeric") > 0.0);
    assert!(results["quality"].is_string());
    assert!(results["recommendation"].is_string());
    assert!(results["simulated"].is_boolean());
}

#[tokio::test]
#[ignore = "Requires a running cafe-wifi-server and database"]
async fn test_run_for_cafe_records_history() {
    let client = client();
    let base_url = base_url();
    let (token, _) = signup(&client).await;

    let resp = client
        .post(format!("{base_url}/api/cafes"))
        .bearer_auth(&token)
        .json(&cafe_payload("Server Tested"))
        .send()
        .await
        .expect("Failed to create cafe");
    let cafe: Value = resp.json().await.expect("Failed to read cafe body");
    let cafe_id = cafe["id"].as_str().expect("cafe has an id");

    let resp = client
        .post(format!("{base_url}/api/speedtest/run/{cafe_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to run speed test");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read run body");
    assert_eq!(body["cafe"]["id"], *cafe_id);

    let resp = client
        .get(format!("{base_url}/api/speedtest/history/{cafe_id}"))
        .send()
        .await
        .expect("Failed to fetch history");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read history body");
    assert_eq!(body["count"], 1);
    assert_eq!(body["history"][0]["deviceType"], "server");
    assert!(body["currentSpeed"]["download"].is_number());
}

#[tokio::test]
#[ignore = "Requires a running cafe-wifi-server and database"]
async fn test_compare_sorts_fastest_first() {
    let client = client();
    let base_url = base_url();
    let (token, _) = signup(&client).await;

    let mut ids = Vec::new();
    for (tag, download) in [("Compare Crawl", 1.5), ("Compare Cruise", 80.0)] {
        let resp = client
            .post(format!("{base_url}/api/cafes"))
            .bearer_auth(&token)
            .json(&cafe_payload(tag))
            .send()
            .await
            .expect("Failed to create cafe");
        let cafe: Value = resp.json().await.expect("Failed to read cafe body");
        let id = cafe["id"].as_str().expect("cafe has an id").to_string();

        let resp = client
            .post(format!("{base_url}/api/cafes/speed-test"))
            .json(&json!({"cafeId": id, "download": download}))
            .send()
            .await
            .expect("Failed to submit speed test");
        assert_eq!(resp.status(), StatusCode::OK);
        ids.push(id);
    }

    let resp = client
        .post(format!("{base_url}/api/speedtest/compare"))
        .json(&json!({"cafeIds": ids}))
        .send()
        .await
        .expect("Failed to compare cafes");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read compare body");
    assert_eq!(body["count"], 2);
    let first = body["comparison"][0]["download"]
        .as_f64()
        .expect("first entry download");
    let second = body["comparison"][1]["download"]
        .as_f64()
        .expect("second entry download");
    assert!(first >= second, "comparison is sorted fastest first");
    assert_eq!(body["summary"]["fastest"], body["comparison"][0]["name"]);
}

#[tokio::test]
#[ignore = "Requires a running cafe-wifi-server and database"]
async fn test_compare_rejects_empty_id_list() {
    let client = client();

    let resp = client
        .post(format!("{}/api/speedtest/compare", base_url()))
        .json(&json!({"cafeIds": []}))
        .send()
        .await
        .expect("Failed to reach compare endpoint");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
