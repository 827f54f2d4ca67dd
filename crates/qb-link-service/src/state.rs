//! Application state.

use std::sync::Arc;

use qb_link_store::Store;

use crate::config::ServiceConfig;
use crate::linker::Linker;
use crate::oauth::{OAuthClient, OAuthError};
use crate::session::SessionSlot;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Intuit OAuth client.
    pub oauth: Arc<OAuthClient>,

    /// The current QuickBooks session, empty until the OAuth callback succeeds.
    pub sessions: SessionSlot,

    /// Customer, invoice and payment operations.
    pub linker: Linker,
}

impl AppState {
    /// Create a new application state with no session.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Configuration` if the OAuth endpoints are invalid.
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Result<Self, OAuthError> {
        let oauth = Arc::new(OAuthClient::new(&config.quickbooks)?);
        let sessions = SessionSlot::new();
        let linker = Linker::new(Arc::clone(&store), sessions.clone());

        match &config.quickbooks.realm_id {
            Some(realm_id) => tracing::info!(realm_id = %realm_id, "QuickBooks realm configured"),
            None => tracing::warn!("QuickBooks realm not configured - using realm from callback"),
        }

        Ok(Self {
            store,
            config,
            oauth,
            sessions,
            linker,
        })
    }

    /// Check if a QuickBooks session has been established.
    pub async fn has_session(&self) -> bool {
        self.sessions.is_established().await
    }
}
