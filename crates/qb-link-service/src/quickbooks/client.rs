//! QuickBooks Online API client implementation.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::types::{
    Customer, CustomerInput, CustomerResponse, FaultResponse, Invoice, InvoiceInput,
    InvoiceResponse, Payment, PaymentInput, PaymentResponse,
};

/// Error type for QuickBooks operations.
#[derive(Debug, thiserror::Error)]
pub enum QuickBooksError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// QuickBooks API returned an error.
    #[error("QuickBooks API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
        /// Fault type.
        fault_type: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// QuickBooks Online API client bound to one company and access token.
#[derive(Clone)]
pub struct QuickBooksClient {
    client: Client,
    base_url: String,
    realm_id: String,
    access_token: String,
    minor_version: u32,
}

impl std::fmt::Debug for QuickBooksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickBooksClient")
            .field("base_url", &self.base_url)
            .field("realm_id", &self.realm_id)
            .field("minor_version", &self.minor_version)
            .finish_non_exhaustive()
    }
}

impl QuickBooksClient {
    /// Create a new QuickBooks client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API URL (e.g., `"https://sandbox-quickbooks.api.intuit.com"`)
    /// * `realm_id` - Company ID
    /// * `access_token` - OAuth bearer token
    /// * `minor_version` - API minor version
    ///
    /// # Errors
    ///
    /// Returns `QuickBooksError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        realm_id: impl Into<String>,
        access_token: impl Into<String>,
        minor_version: u32,
    ) -> Result<Self, QuickBooksError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| QuickBooksError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            realm_id: realm_id.into(),
            access_token: access_token.into(),
            minor_version,
        })
    }

    /// The company this client works against.
    #[must_use]
    pub fn realm_id(&self) -> &str {
        &self.realm_id
    }

    /// Create a customer.
    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, QuickBooksError> {
        self.create::<_, CustomerResponse>("customer", input)
            .await
            .map(|r| r.customer)
    }

    /// Create an invoice.
    pub async fn create_invoice(&self, input: &InvoiceInput) -> Result<Invoice, QuickBooksError> {
        self.create::<_, InvoiceResponse>("invoice", input)
            .await
            .map(|r| r.invoice)
    }

    /// Create a payment.
    pub async fn create_payment(&self, input: &PaymentInput) -> Result<Payment, QuickBooksError> {
        self.create::<_, PaymentResponse>("payment", input)
            .await
            .map(|r| r.payment)
    }

    /// URL of an entity endpoint for this company.
    fn entity_url(&self, entity: &str) -> String {
        format!(
            "{}/v3/company/{}/{}?minorversion={}",
            self.base_url, self.realm_id, entity, self.minor_version
        )
    }

    /// POST a new entity.
    async fn create<I: Serialize, T: DeserializeOwned>(
        &self,
        entity: &str,
        input: &I,
    ) -> Result<T, QuickBooksError> {
        let response = self
            .client
            .post(self.entity_url(entity))
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .json(input)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, QuickBooksError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse fault response
        let error_body: Result<FaultResponse, _> = response.json().await;

        match error_body {
            Ok(FaultResponse { fault }) => {
                let first = fault.errors.into_iter().next();
                let message = match &first {
                    Some(e) => match &e.detail {
                        Some(detail) => format!("{} - details: {detail}", e.message),
                        None => e.message.clone(),
                    },
                    None => format!("HTTP {status}"),
                };
                Err(QuickBooksError::Api {
                    status: status.as_u16(),
                    message,
                    code: first.and_then(|e| e.code),
                    fault_type: fault.fault_type,
                })
            }
            Err(_) => Err(QuickBooksError::Api {
                status: status.as_u16(),
                message: format!("HTTP {status}"),
                code: None,
                fault_type: None,
            }),
        }
    }
}
