//! Pass-through to the hh.ru job-board API and its OAuth token endpoint.
//!
//! The web app cannot call hh.ru directly from the browser, so requests are
//! relayed through the backend unchanged apart from the header allowlist.

pub mod handlers;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;

pub const DEFAULT_HH_USER_AGENT: &str = "HRAssistant/1.0";

/// What the relay answers with: the upstream status and its decoded body.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Option<Value>,
}

/// An API call to relay.
#[derive(Debug)]
pub struct ForwardRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub authorization: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub body: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HhTokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub auth_code: String,
}

pub fn target_url(base: &str, path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{base}/{path}?{query}"),
        None => format!("{base}/{path}"),
    }
}

/// Relays one request to `{base}/{path}`. Only `Authorization` and
/// `HH-User-Agent` are forwarded; the body only for POST and PUT.
pub async fn forward(
    http: &reqwest::Client,
    base: &str,
    req: ForwardRequest<'_>,
) -> Result<UpstreamReply, AppError> {
    let url = target_url(base, req.path, req.query);
    debug!("Relaying {} {url}", req.method);

    let sends_body = req.method == Method::POST || req.method == Method::PUT;
    let mut builder = http.request(req.method, &url).header(
        "HH-User-Agent",
        req.user_agent.unwrap_or(DEFAULT_HH_USER_AGENT),
    );
    if let Some(auth) = req.authorization {
        builder = builder.header(reqwest::header::AUTHORIZATION, auth);
    }
    if sends_body {
        builder = builder
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(req.body);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;

    if text.trim().is_empty() {
        return Ok(UpstreamReply { status, body: None });
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(body) => Ok(UpstreamReply {
            status,
            body: Some(body),
        }),
        Err(_) => {
            warn!("hh.ru answered {status} with a non-JSON body");
            Err(AppError::Upstream {
                status,
                message: text,
            })
        }
    }
}

/// Exchanges an hh.ru authorization code for tokens.
pub async fn exchange_hh_code(
    http: &reqwest::Client,
    oauth_base: &str,
    req: &HhTokenRequest,
) -> Result<Value, AppError> {
    let response = http
        .post(format!("{oauth_base}/oauth/token"))
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
            ("code", req.auth_code.as_str()),
        ])
        .send()
        .await?;

    let status = response.status().as_u16();
    let text = response.text().await?;
    if status != 200 {
        return Err(AppError::Upstream {
            status,
            message: text,
        });
    }

    serde_json::from_str(&text).map_err(|_| AppError::Upstream {
        status: 502,
        message: format!("hh.ru token endpoint returned a non-JSON body: {text}"),
    })
}
