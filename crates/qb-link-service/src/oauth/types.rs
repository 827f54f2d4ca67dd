//! Intuit OAuth2 types.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::client::OAuthError;

/// OAuth scopes requested during authorization.
pub mod scopes {
    /// QuickBooks Online accounting API.
    pub const ACCOUNTING: &str = "com.intuit.quickbooks.accounting";
    /// OpenID Connect identity.
    pub const OPENID: &str = "openid";
}

/// Query parameters Intuit appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// Echo of the `state` sent with the authorization request.
    pub state: Option<String>,
    /// Company the user connected.
    #[serde(rename = "realmId")]
    pub realm_id: Option<String>,
    /// Error code when the user declined or the request was invalid.
    pub error: Option<String>,
    /// Human-readable error description.
    pub error_description: Option<String>,
}

/// Token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: String,
    /// Token type (`bearer`).
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Refresh token lifetime in seconds.
    #[serde(default)]
    pub x_refresh_token_expires_in: Option<i64>,
    /// OpenID Connect ID token, present when the `openid` scope was granted.
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Token endpoint error body.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorResponse {
    /// Error code (e.g. `invalid_grant`).
    pub error: String,
    /// Human-readable description.
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Claims read from the ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Intuit user the token was issued for.
    pub sub: String,
    /// Company the user connected.
    #[serde(default)]
    pub realmid: Option<String>,
}

/// The access/refresh token pair held by a session.
#[derive(Clone)]
pub struct TokenSet {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Refresh token. Held but never used.
    pub refresh_token: String,
    /// Token type (`bearer`).
    pub token_type: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
    /// When the refresh token expires, if reported.
    pub refresh_expires_at: Option<DateTime<Utc>>,
    /// OpenID Connect ID token.
    pub id_token: Option<String>,
}

impl TokenSet {
    /// Build a token set from a token response received at `now`.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::InvalidTokenResponse` if a lifetime does not fit
    /// in a timestamp.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Result<Self, OAuthError> {
        let refresh_expires_at = response
            .x_refresh_token_expires_in
            .map(|secs| expiry(now, "x_refresh_token_expires_in", secs))
            .transpose()?;

        Ok(Self {
            expires_at: expiry(now, "expires_in", response.expires_in)?,
            refresh_expires_at,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            id_token: response.id_token,
        })
    }
}

fn expiry(now: DateTime<Utc>, field: &str, secs: i64) -> Result<DateTime<Utc>, OAuthError> {
    Duration::try_seconds(secs)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| OAuthError::InvalidTokenResponse(format!("{field} out of range: {secs}")))
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A successful authorization: tokens plus the realm reported on the callback.
#[derive(Debug, Clone)]
pub struct Authorization {
    /// The token pair.
    pub tokens: TokenSet,
    /// `realmId` from the callback query, if present.
    pub realm_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(expires_in: i64, refresh_expires_in: i64) -> TokenResponse {
        serde_json::from_value(serde_json::json!({
            "access_token": "access-abc",
            "refresh_token": "refresh-xyz",
            "token_type": "bearer",
            "expires_in": expires_in,
            "x_refresh_token_expires_in": refresh_expires_in
        }))
        .unwrap()
    }

    fn response() -> TokenResponse {
        response_with(3600, 8_726_400)
    }

    #[test]
    fn token_set_expiry() {
        let now = Utc::now();
        let tokens = TokenSet::from_response(response(), now).unwrap();
        assert_eq!(tokens.expires_at, now + Duration::seconds(3600));
        assert_eq!(
            tokens.refresh_expires_at,
            Some(now + Duration::seconds(8_726_400))
        );
        assert!(tokens.id_token.is_none());
    }

    #[test]
    fn token_set_rejects_out_of_range_lifetimes() {
        let now = Utc::now();

        let result = TokenSet::from_response(response_with(i64::MAX, 8_726_400), now);
        assert!(
            matches!(&result, Err(OAuthError::InvalidTokenResponse(msg)) if msg.starts_with("expires_in")),
            "{result:?}"
        );

        let result = TokenSet::from_response(response_with(3600, i64::MIN), now);
        assert!(
            matches!(&result, Err(OAuthError::InvalidTokenResponse(msg)) if msg.starts_with("x_refresh_token_expires_in")),
            "{result:?}"
        );
    }

    #[test]
    fn token_set_debug_is_redacted() {
        let tokens = TokenSet::from_response(response(), Utc::now()).unwrap();
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("access-abc"));
        assert!(!debug.contains("refresh-xyz"));
    }

    #[test]
    fn callback_params_read_realm_id() {
        let params: CallbackParams = serde_json::from_value(serde_json::json!({
            "code": "c",
            "state": "s",
            "realmId": "4620816365"
        }))
        .unwrap();
        assert_eq!(params.realm_id.as_deref(), Some("4620816365"));
    }
}
