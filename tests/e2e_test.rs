//! End-to-end tests against a running server and a real gateway.
//!
//! These tests require:
//! 1. The server running (`cargo run`) with BACKEND_BASE_URL and BACKEND_TOKEN set
//! 2. E2E_MEDIA_ID pointing at an uploaded audio file the token may access
//!
//! Run with: cargo test --test e2e_test -- --ignored --nocapture
//!
//! Set API_BASE_URL to override default (http://localhost:3000)

use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

const MAX_WAIT: Duration = Duration::from_secs(600);
const POLL_EVERY: Duration = Duration::from_secs(2);

/// Get base URL from env or default to localhost
fn get_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn get_media_id() -> u64 {
    std::env::var("E2E_MEDIA_ID")
        .expect("E2E_MEDIA_ID must be set")
        .parse()
        .expect("E2E_MEDIA_ID must be numeric")
}

async fn wait_for_terminal(client: &reqwest::Client, url: &str) -> Value {
    let started = std::time::Instant::now();
    loop {
        let job: Value = client
            .get(url)
            .send()
            .await
            .expect("Failed to fetch job")
            .json()
            .await
            .expect("Job response was not JSON");

        println!("  status={} progress={}", job["status"], job["progress"]);
        if job["status"] == "SUCCESS" || job["status"] == "FAILED" {
            return job;
        }

        assert!(started.elapsed() < MAX_WAIT, "Job did not finish in time");
        sleep(POLL_EVERY).await;
    }
}

#[tokio::test]
#[ignore] // Requires running server and gateway
async fn test_e2e_health_check() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", get_base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Health response was not JSON");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore]
async fn test_e2e_separation_round_trip() {
    let base_url = get_base_url();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/v1/separations", base_url))
        .json(&json!({"media_id": get_media_id(), "label": "e2e", "mode": "vocal"}))
        .send()
        .await
        .expect("Failed to submit separation");
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let accepted: Value = response.json().await.expect("Submit response was not JSON");
    let job_id = accepted["job_id"].as_str().expect("job_id missing").to_string();
    println!("  ✓ Submitted, job_id: {}", job_id);

    let job = wait_for_terminal(&client, &format!("{}/api/v1/separations/{}", base_url, job_id)).await;

    if job["status"] == "SUCCESS" {
        let results = job["results"].as_array().expect("results missing");
        assert!(!results.is_empty());
        assert_eq!(results[0]["name"], "Vocal");
    } else {
        println!("  ⚠ Job failed: {}", job["error_message"]);
    }
}

#[tokio::test]
#[ignore]
async fn test_e2e_side_panel_is_cached() {
    let base_url = get_base_url();
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/side-panel", base_url);

    let first = client.get(&url).send().await.expect("Failed to fetch side panel");
    let second = client.get(&url).send().await.expect("Failed to fetch side panel");

    assert_eq!(first.status(), second.status());
    if first.status().is_success() {
        let a: Value = first.json().await.unwrap();
        let b: Value = second.json().await.unwrap();
        assert_eq!(a, b);
    }
}
