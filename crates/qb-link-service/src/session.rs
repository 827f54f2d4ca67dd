//! QuickBooks session state.
//!
//! A session is the token pair obtained from the OAuth callback plus a
//! QuickBooks client configured with it. The [`SessionSlot`] is shared by all
//! handlers: empty at startup, filled by each successful callback, lost on
//! restart. Tokens are never refreshed.

use std::sync::Arc;

use jsonwebtoken::{decode, DecodingKey, Validation};
use tokio::sync::RwLock;

use crate::config::QuickBooksConfig;
use crate::oauth::{Authorization, IdTokenClaims, OAuthClient, OAuthError, TokenSet};
use crate::quickbooks::QuickBooksClient;

/// An authorized connection to one QuickBooks company.
#[derive(Debug)]
pub struct AccountingSession {
    tokens: TokenSet,
    realm_id: String,
    subject: Option<String>,
    client: QuickBooksClient,
}

impl AccountingSession {
    /// Build a session from a completed authorization.
    ///
    /// The configured realm wins over the one reported on the callback.
    ///
    /// # Errors
    ///
    /// - `OAuthError::MissingRealm` if no realm is known.
    /// - `OAuthError::Configuration` if the API client cannot be built.
    pub fn new(authorization: Authorization, config: &QuickBooksConfig) -> Result<Self, OAuthError> {
        let Authorization { tokens, realm_id } = authorization;

        let realm_id = match (&config.realm_id, realm_id) {
            (Some(configured), Some(returned)) if *configured != returned => {
                tracing::warn!(
                    configured = %configured,
                    returned = %returned,
                    "Callback realm differs from configured realm - using configured"
                );
                configured.clone()
            }
            (Some(configured), _) => configured.clone(),
            (None, Some(returned)) => returned,
            (None, None) => return Err(OAuthError::MissingRealm),
        };

        let subject = tokens.id_token.as_deref().and_then(|token| {
            match read_id_token_claims(token) {
                Ok(claims) => Some(claims.sub),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable ID token");
                    None
                }
            }
        });

        let client = QuickBooksClient::new(
            &config.api_base_url,
            &realm_id,
            &tokens.access_token,
            config.minor_version,
        )
        .map_err(|e| OAuthError::Configuration(e.to_string()))?;

        Ok(Self {
            tokens,
            realm_id,
            subject,
            client,
        })
    }

    /// The API client for this session.
    #[must_use]
    pub fn client(&self) -> &QuickBooksClient {
        &self.client
    }

    /// The company this session works against.
    #[must_use]
    pub fn realm_id(&self) -> &str {
        &self.realm_id
    }

    /// The Intuit user who authorized, if the ID token named one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The token pair.
    #[must_use]
    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }
}

/// Read the claims of an ID token without verifying its signature.
///
/// The claims are only used for logging, never for authorization decisions.
///
/// # Errors
///
/// Returns an error if the token is not a well-formed JWT.
pub fn read_id_token_claims(token: &str) -> Result<IdTokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<IdTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).map(|data| data.claims)
}

/// Process-wide holder of the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<Arc<AccountingSession>>>>,
}

impl SessionSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session, if authorization has completed.
    pub async fn current(&self) -> Option<Arc<AccountingSession>> {
        self.inner.read().await.clone()
    }

    /// Whether a session exists.
    pub async fn is_established(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Install a session, replacing any previous one.
    pub async fn install(&self, session: AccountingSession) -> Arc<AccountingSession> {
        let session = Arc::new(session);
        *self.inner.write().await = Some(Arc::clone(&session));
        session
    }

    /// Exchange an OAuth callback for tokens and install the resulting session.
    ///
    /// On failure the slot is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an `OAuthError` if the callback is rejected, the token exchange
    /// fails or no realm is known.
    pub async fn complete_authorization(
        &self,
        oauth: &OAuthClient,
        config: &QuickBooksConfig,
        callback_url: &str,
    ) -> Result<Arc<AccountingSession>, OAuthError> {
        let authorization = oauth.exchange_callback(callback_url).await?;
        let session = AccountingSession::new(authorization, config)?;

        tracing::info!(
            realm_id = %session.realm_id(),
            subject = ?session.subject(),
            expires_at = %session.tokens().expires_at,
            "QuickBooks session established"
        );

        Ok(self.install(session).await)
    }
}
