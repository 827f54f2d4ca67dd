//! Customer handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, Redirect};
use axum::{Form, Json};
use serde::Deserialize;

use crate::error::ApiError;
use crate::pages;
use crate::state::AppState;

/// `GET /customers` - all customer records with invoice actions.
pub async fn list_customers(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let customers = state.store.find_all().await?;
    Ok(Html(pages::customers(&customers)))
}

/// Customer creation request, accepted as a form post or JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    /// Display name for the new customer.
    pub display_name: String,
}

#[async_trait]
impl<S> FromRequest<S> for CreateCustomerRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<Self>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(body)
        } else {
            let Form(body) = Form::<Self>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(body)
        }
    }
}

/// `POST /customers` - create a customer in QuickBooks and record it.
///
/// Without a QuickBooks session the user is redirected to the login page,
/// whatever the body holds.
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Redirect, ApiError> {
    if !state.has_session().await {
        return Err(ApiError::SessionRequired);
    }

    let request = CreateCustomerRequest::from_request(request, &state).await?;
    state.linker.create_customer(&request.display_name).await?;
    Ok(Redirect::to("/customers"))
}
