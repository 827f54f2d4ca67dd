//! Intuit OAuth2 client implementation.

use reqwest::{Client, Url};
use std::time::Duration;

use super::types::{
    scopes, Authorization, CallbackParams, OAuthErrorResponse, TokenResponse, TokenSet,
};
use crate::config::QuickBooksConfig;

/// Error type for OAuth operations.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The user declined access or Intuit rejected the authorization request.
    #[error("authorization denied: {error}")]
    Denied {
        /// Error code from the callback.
        error: String,
        /// Error description from the callback.
        description: Option<String>,
    },

    /// The callback's `state` does not match the one we sent.
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// The callback carries no authorization code.
    #[error("authorization code missing from callback")]
    MissingCode,

    /// The callback URL could not be parsed.
    #[error("invalid callback URL: {0}")]
    InvalidCallback(String),

    /// Token endpoint rejected the exchange.
    #[error("token exchange failed: {status} - {error}")]
    Token {
        /// HTTP status code.
        status: u16,
        /// Error code.
        error: String,
        /// Error description.
        description: Option<String>,
    },

    /// Token endpoint answered with a body we cannot use.
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// Neither the configuration nor the callback named a realm.
    #[error("no QuickBooks realm configured or returned on callback")]
    MissingRealm,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Intuit OAuth2 client for the authorization-code flow.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: Url,
    authorize_url: Url,
    token_url: Url,
    state: String,
}

impl OAuthClient {
    /// Create a new OAuth client from QuickBooks settings.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Configuration` if an endpoint URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &QuickBooksConfig) -> Result<Self, OAuthError> {
        let parse = |name: &str, value: &str| {
            Url::parse(value)
                .map_err(|e| OAuthError::Configuration(format!("invalid {name} '{value}': {e}")))
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OAuthError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: parse("redirect URI", &config.redirect_uri)?,
            authorize_url: parse("authorize URL", &config.authorize_url)?,
            token_url: parse("token URL", &config.token_url)?,
            state: config.oauth_state.clone(),
        })
    }

    /// Build the URL that sends the user to Intuit's consent screen.
    ///
    /// Deterministic: depends only on configuration.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        let scope = format!("{} {}", scopes::ACCOUNTING, scopes::OPENID);

        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", &scope)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("state", &self.state);
        url.into()
    }

    /// Parse the query of a callback URL.
    ///
    /// `callback_url` may be absolute or the path and query the server received.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidCallback` if the URL cannot be parsed.
    pub fn parse_callback(&self, callback_url: &str) -> Result<CallbackParams, OAuthError> {
        let url = self
            .redirect_uri
            .join(callback_url)
            .map_err(|e| OAuthError::InvalidCallback(e.to_string()))?;

        let mut params = CallbackParams::default();
        for (key, value) in url.query_pairs() {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "code" => params.code = value,
                "state" => params.state = value,
                "realmId" => params.realm_id = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                _ => {}
            }
        }
        Ok(params)
    }

    /// Exchange the authorization code carried by a callback URL for tokens.
    ///
    /// Denials and state mismatches fail before any request is made.
    ///
    /// # Errors
    ///
    /// Returns an `OAuthError` if the callback is invalid or the exchange fails.
    pub async fn exchange_callback(&self, callback_url: &str) -> Result<Authorization, OAuthError> {
        let params = self.parse_callback(callback_url)?;

        if let Some(error) = params.error {
            return Err(OAuthError::Denied {
                error,
                description: params.error_description,
            });
        }

        if params.state.as_deref() != Some(self.state.as_str()) {
            return Err(OAuthError::StateMismatch);
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(OAuthError::MissingCode)?;

        let response = self.exchange_code(&code).await?;
        let tokens = TokenSet::from_response(response, chrono::Utc::now())?;

        tracing::debug!(
            realm_id = ?params.realm_id,
            expires_at = %tokens.expires_at,
            "Authorization code exchanged"
        );

        Ok(Authorization {
            tokens,
            realm_id: params.realm_id,
        })
    }

    /// Call the token endpoint with an authorization code.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<OAuthErrorResponse, _> = response.json().await;

        match error_body {
            Ok(body) => Err(OAuthError::Token {
                status: status.as_u16(),
                error: body.error,
                description: body.error_description,
            }),
            Err(_) => Err(OAuthError::Token {
                status: status.as_u16(),
                error: format!("HTTP {status}"),
                description: None,
            }),
        }
    }
}
