//! Common test utilities for qb-link integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qb_link_service::config::{Environment, QuickBooksConfig};
use qb_link_service::{create_router, AppState, ServiceConfig};
use qb_link_store::{RocksStore, Store};

/// Realm every test runs against.
pub const REALM_ID: &str = "123";

/// Access token issued by the mocked token endpoint.
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Token endpoint path on the mock server.
pub const TOKEN_PATH: &str = "/oauth2/v1/tokens/bearer";

/// Path of a QuickBooks entity endpoint for the test realm.
pub fn entity_path(entity: &str) -> String {
    format!("/v3/company/{REALM_ID}/{entity}")
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Stands in for Intuit OAuth and the QuickBooks API.
    pub mock: MockServer,
    /// The store behind the server.
    pub store: Arc<RocksStore>,
    /// State shared with the server (same session slot).
    pub state: AppState,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and no session.
    pub async fn new() -> Self {
        Self::with_store(|store| store as Arc<dyn Store>).await
    }

    /// Create a harness whose server sees the store returned by `wrap`.
    ///
    /// `wrap` receives the fresh RocksDB store; `harness.store` keeps pointing
    /// at it so tests can inspect what was actually written.
    pub async fn with_store<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<RocksStore>) -> Arc<dyn Store>,
    {
        let mock = MockServer::start().await;
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let mut quickbooks = QuickBooksConfig::new(
            "test-client",
            "test-secret",
            "http://localhost:3000/callback",
            Environment::Sandbox,
        );
        quickbooks.realm_id = Some(REALM_ID.into());
        quickbooks.authorize_url = format!("{}/connect/oauth2", mock.uri());
        quickbooks.token_url = format!("{}{TOKEN_PATH}", mock.uri());
        quickbooks.api_base_url = mock.uri();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            database: None,
            quickbooks,
            invoice_due_days: 30,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(wrap(store.clone()), config).expect("Failed to build state");
        let router: Router = create_router(state.clone());

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            mock,
            store,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Create a harness that has already completed the OAuth callback.
    pub async fn logged_in() -> Self {
        let harness = Self::new().await;
        harness.login().await;
        harness
    }

    /// Mount a successful token endpoint and complete the OAuth callback.
    pub async fn login(&self) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
            .mount(&self.mock)
            .await;

        let response = self
            .server
            .get("/callback")
            .add_query_param("code", "test-code")
            .add_query_param("state", "intuit-test")
            .add_query_param("realmId", REALM_ID)
            .await;

        response.assert_status_ok();
    }

    /// Mount a QuickBooks customer endpoint that accepts any customer.
    pub async fn mock_customer_created(&self, external_id: &str, display_name: &str) {
        Mock::given(method("POST"))
            .and(path(entity_path("customer")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Customer": {
                    "Id": external_id,
                    "DisplayName": display_name,
                    "SyncToken": "0"
                },
                "time": "2022-01-25T10:00:00.000-08:00"
            })))
            .mount(&self.mock)
            .await;
    }
}

/// A token endpoint success body.
pub fn token_response() -> serde_json::Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "test-refresh-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "x_refresh_token_expires_in": 8_726_400
    })
}

/// A QuickBooks fault body.
pub fn fault(message: &str, code: &str) -> serde_json::Value {
    json!({
        "Fault": {
            "Error": [{ "Message": message, "Detail": message, "code": code }],
            "type": "ValidationFault"
        },
        "time": "2022-01-25T10:00:00.000-08:00"
    })
}
