//! Invoice integration tests.

mod common;

use axum::http::StatusCode;
use common::{entity_path, fault, TestHarness};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use qb_link_core::CustomerId;
use qb_link_store::Store;

fn invoice_created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Invoice": {
            "Id": id,
            "DocNumber": "1037",
            "TotalAmt": 1000.0,
            "Balance": 1000.0,
            "CustomerRef": { "value": "58", "name": "Jane Doe" }
        }
    }))
}

// ============================================================================
// Salary advance
// ============================================================================

#[tokio::test]
async fn salary_advance_invoice_is_created_and_recorded() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .and(body_json(json!({
            "CustomerRef": { "value": "58" },
            "Line": [{
                "Amount": 1000.0,
                "DetailType": "SalesItemLineDetail",
                "SalesItemLineDetail": {
                    "ItemRef": { "value": "31", "name": "Salary Advance" },
                    "TaxCodeRef": { "value": "7" }
                }
            }],
            "DueDate": "2022-01-31",
            "TxnDate": "2022-01-25"
        })))
        .respond_with(invoice_created("145"))
        .expect(1)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .add_query_param("txnDate", "2022-01-25")
        .add_query_param("dueDate", "2022-01-31")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/customers");

    let updated = harness.store.find_by_id(&customer.id).await.unwrap().unwrap();
    assert_eq!(updated.salary_advance_invoice_id.as_deref(), Some("145"));
    assert!(updated.tip_invoice_id.is_none());
    assert_eq!(updated.display_name, "Jane Doe");
    assert_eq!(updated.external_customer_id, "58");
}

#[tokio::test]
async fn salary_advance_invoice_with_custom_amount() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .and(body_partial_json(json!({ "Line": [{ "Amount": 250.5 }] })))
        .respond_with(invoice_created("146"))
        .expect(1)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .add_query_param("amount", "250.5")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
}

// ============================================================================
// Tip
// ============================================================================

#[tokio::test]
async fn tip_invoice_uses_tip_item_and_default_due_date() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .and(body_partial_json(json!({
            "Line": [{
                "Amount": 100.0,
                "SalesItemLineDetail": {
                    "ItemRef": { "value": "30" },
                    "TaxCodeRef": { "value": "11" }
                }
            }],
            "TxnDate": "2022-01-01",
            "DueDate": "2022-01-31"
        })))
        .respond_with(invoice_created("150"))
        .expect(1)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createTipInvoice", customer.id))
        .add_query_param("txnDate", "2022-01-01")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);

    let updated = harness.store.find_by_id(&customer.id).await.unwrap().unwrap();
    assert_eq!(updated.tip_invoice_id.as_deref(), Some("150"));
    assert!(updated.salary_advance_invoice_id.is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn invoice_without_session_redirects_to_login() {
    let harness = TestHarness::new().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .respond_with(invoice_created("145"))
        .expect(0)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
}

#[tokio::test]
async fn invoice_for_unknown_customer_is_not_found() {
    let harness = TestHarness::logged_in().await;

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .respond_with(invoice_created("145"))
        .expect(0)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createTipInvoice", CustomerId::generate()))
        .await;
    response.assert_status_not_found();

    let response = harness
        .server
        .get("/customers/not-an-id/createTipInvoice")
        .await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn invoice_remote_fault_leaves_record_unchanged() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(fault("Invalid Reference Id", "2500")),
        )
        .expect(1)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);

    let unchanged = harness.store.find_by_id(&customer.id).await.unwrap().unwrap();
    assert!(unchanged.salary_advance_invoice_id.is_none());
}

#[tokio::test]
async fn invoice_due_before_transaction_is_rejected() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .add_query_param("txnDate", "2022-01-25")
        .add_query_param("dueDate", "2022-01-01")
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn invoice_non_positive_amount_is_rejected_without_remote_call() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .respond_with(invoice_created("145"))
        .expect(0)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createTipInvoice", customer.id))
        .add_query_param("amount", "0")
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn invoice_malformed_query_is_json_bad_request() {
    let harness = TestHarness::logged_in().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    Mock::given(method("POST"))
        .and(path(entity_path("invoice")))
        .respond_with(invoice_created("145"))
        .expect(0)
        .mount(&harness.mock)
        .await;

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .add_query_param("txnDate", "bad")
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");

    let response = harness
        .server
        .get(&format!("/customers/{}/createTipInvoice", customer.id))
        .add_query_param("amount", "lots")
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn invoice_malformed_query_without_session_redirects_to_login() {
    let harness = TestHarness::new().await;
    let customer = harness.store.create("Jane Doe", "58").await.unwrap();

    let response = harness
        .server
        .get(&format!("/customers/{}/createSAInvoice", customer.id))
        .add_query_param("txnDate", "bad")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
}
