use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::mail::oauth::{authorize_url, exchange_code, fetch_user_email, MailProvider};
use crate::mail::send::{send_email, Letter, SendOutcome};
use crate::mail::MailError;
use crate::models::profile::ProfileUpdate;
use crate::records::profiles;
use crate::state::AppState;

const DEFAULT_OAUTH_STATE: &str = "default_user";
/// Upper bound on the recorded token lifetime.
const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Deserialize)]
pub struct OAuthStartQuery {
    pub state: Option<String>,
}

#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declines consent.
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SendEmailRequest {
    pub user_id: String,
    pub to_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

fn oauth_state(state: Option<String>) -> String {
    state
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_OAUTH_STATE.to_string())
}

/// `{webapp_url}/settings` with the outcome in the query string.
fn settings_redirect(webapp_url: &str, outcome: Result<(), String>) -> Redirect {
    let param = match &outcome {
        Ok(()) => ("success", "true"),
        Err(message) => ("error", message.as_str()),
    };
    let target = Url::parse_with_params(&format!("{webapp_url}/settings"), [param])
        .map(String::from)
        .unwrap_or_else(|_| format!("{webapp_url}/settings"));
    Redirect::temporary(&target)
}

/// GET /oauth/:provider/start
pub async fn handle_oauth_start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthStartQuery>,
) -> Result<Redirect, AppError> {
    let provider: MailProvider = provider.parse()?;
    let url = authorize_url(
        provider,
        state.config.mail.credentials(provider),
        &oauth_state(query.state),
    );
    Ok(Redirect::temporary(url.as_str()))
}

/// GET /oauth/:provider/callback
///
/// Always redirects back to the settings page; failures travel in `?error=`.
pub async fn handle_oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    let outcome = connect_mailbox(&state, &provider, query).await.map_err(|e| {
        warn!("Mailbox connection via {provider} failed: {e}");
        e.to_string()
    });
    settings_redirect(&state.config.webapp_url, outcome)
}

fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    now + Duration::seconds(expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS))
}

async fn connect_mailbox(
    state: &AppState,
    provider: &str,
    query: OAuthCallbackQuery,
) -> Result<(), AppError> {
    let provider: MailProvider = provider.parse()?;
    if let Some(error) = query.error {
        return Err(AppError::Validation(error));
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("code is required".to_string()))?;
    let user_id = oauth_state(query.state);

    let creds = state.config.mail.credentials(provider);
    let tokens = exchange_code(&state.http, provider, creds, &code).await?;
    let email = fetch_user_email(&state.http, provider, &tokens.access_token).await?;
    let expiry = token_expiry(Utc::now(), tokens.expires_in);

    profiles::get_or_create_profile(&state.db, &user_id).await?;
    let update = ProfileUpdate {
        email_provider: Some(provider.as_str().to_string()),
        email_address: Some(email.clone()),
        email_access_token: Some(tokens.access_token),
        email_refresh_token: tokens.refresh_token,
        email_token_expiry: Some(expiry.to_rfc3339()),
        ..Default::default()
    };
    profiles::update_profile(&state.db, &user_id, &update).await?;

    info!("Connected {provider} mailbox {email} for user {user_id}");
    Ok(())
}

/// POST /api/send_email
pub async fn handle_send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<SendOutcome>, AppError> {
    let profile = profiles::get_profile(&state.db, &req.user_id)
        .await?
        .ok_or(MailError::NotConnected)?;
    let access_token = profile
        .email_access_token
        .filter(|t| !t.is_empty())
        .ok_or(MailError::NotConnected)?;
    let provider: MailProvider = profile
        .email_provider
        .as_deref()
        .ok_or(MailError::NotConnected)?
        .parse()?;
    let from = profile.email_address.unwrap_or_default();

    let letter = Letter {
        from: &from,
        to: &req.to_email,
        subject: &req.subject,
        body: &req.body,
    };
    let outcome = send_email(&state.http, provider, &access_token, &letter).await?;
    Ok(Json(outcome))
}
