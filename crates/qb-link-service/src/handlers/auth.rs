//! Login and OAuth callback handlers.

use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::pages;
use crate::state::AppState;

/// `GET /` - landing page with the Intuit login link.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let logged_in = state.has_session().await;
    Html(pages::index(&state.oauth.authorization_url(), logged_in))
}

/// `GET /auth` - the login link alone.
pub async fn auth_link(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::auth_link(&state.oauth.authorization_url()))
}

/// `GET /callback` - OAuth redirect target.
///
/// Exchanges the authorization code and installs the session. Any failure is
/// logged and the user is sent back to the login page with the previous
/// session, if any, left in place.
pub async fn callback(State(state): State<Arc<AppState>>, OriginalUri(uri): OriginalUri) -> Response {
    let callback_url = uri.to_string();

    match state
        .sessions
        .complete_authorization(&state.oauth, &state.config.quickbooks, &callback_url)
        .await
    {
        Ok(_) => Html(pages::logged_in()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "OAuth callback failed");
            Redirect::to("/").into_response()
        }
    }
}
