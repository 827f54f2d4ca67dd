//! Health endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_returns_json() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "qb-link");
    assert_eq!(body["quickbooks_connected"], false);
}

#[tokio::test]
async fn health_check_reports_session() {
    let harness = TestHarness::logged_in().await;

    let body: serde_json::Value = harness.server.get("/health").await.json();

    assert_eq!(body["quickbooks_connected"], true);
}
