use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderCredentials;
use crate::mail::MailError;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

const YANDEX_AUTHORIZE_URL: &str = "https://oauth.yandex.ru/authorize";
const YANDEX_TOKEN_URL: &str = "https://oauth.yandex.ru/token";
const YANDEX_USERINFO_URL: &str = "https://login.yandex.ru/info";

const MAILRU_AUTHORIZE_URL: &str = "https://oauth.mail.ru/login";
const MAILRU_TOKEN_URL: &str = "https://oauth.mail.ru/token";
const MAILRU_USERINFO_URL: &str = "https://oauth.mail.ru/userinfo";

const DEFAULT_EXPIRES_IN: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailProvider {
    Google,
    Yandex,
    MailRu,
}

impl MailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailProvider::Google => "google",
            MailProvider::Yandex => "yandex",
            MailProvider::MailRu => "mailru",
        }
    }

    pub fn token_url(&self) -> &'static str {
        match self {
            MailProvider::Google => GOOGLE_TOKEN_URL,
            MailProvider::Yandex => YANDEX_TOKEN_URL,
            MailProvider::MailRu => MAILRU_TOKEN_URL,
        }
    }

    pub fn userinfo_url(&self) -> &'static str {
        match self {
            MailProvider::Google => GOOGLE_USERINFO_URL,
            MailProvider::Yandex => YANDEX_USERINFO_URL,
            MailProvider::MailRu => MAILRU_USERINFO_URL,
        }
    }

    /// Yandex wants `OAuth <token>` instead of a bearer token.
    fn authorization_header(&self, token: &str) -> String {
        match self {
            MailProvider::Yandex => format!("OAuth {token}"),
            _ => format!("Bearer {token}"),
        }
    }

    /// Field of the userinfo document holding the mailbox address.
    fn email_field(&self) -> &'static str {
        match self {
            MailProvider::Yandex => "default_email",
            _ => "email",
        }
    }
}

impl FromStr for MailProvider {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(MailProvider::Google),
            "yandex" => Ok(MailProvider::Yandex),
            "mailru" => Ok(MailProvider::MailRu),
            other => Err(MailError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for MailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN
}

/// Consent-screen URL the user is redirected to. `state` comes back on the
/// callback and carries the user id.
pub fn authorize_url(provider: MailProvider, creds: &ProviderCredentials, state: &str) -> Url {
    let mut params = vec![
        ("client_id", creds.client_id.as_str()),
        ("redirect_uri", creds.redirect_uri.as_str()),
        ("response_type", "code"),
    ];

    let base = match provider {
        MailProvider::Google => {
            params.extend([
                ("scope", GOOGLE_SEND_SCOPE),
                ("access_type", "offline"),
                ("state", state),
                ("prompt", "consent"),
            ]);
            GOOGLE_AUTHORIZE_URL
        }
        MailProvider::Yandex => {
            params.extend([("state", state), ("force_confirm", "yes")]);
            YANDEX_AUTHORIZE_URL
        }
        MailProvider::MailRu => {
            params.extend([("scope", "userinfo mail.imap"), ("state", state)]);
            MAILRU_AUTHORIZE_URL
        }
    };

    let mut url = Url::parse(base).expect("provider authorize URL is a valid constant");
    url.query_pairs_mut().extend_pairs(params);
    url
}

pub async fn exchange_code(
    http: &reqwest::Client,
    provider: MailProvider,
    creds: &ProviderCredentials,
    code: &str,
) -> Result<TokenResponse, MailError> {
    exchange_code_at(http, provider.token_url(), provider, creds, code).await
}

async fn exchange_code_at(
    http: &reqwest::Client,
    token_url: &str,
    provider: MailProvider,
    creds: &ProviderCredentials,
    code: &str,
) -> Result<TokenResponse, MailError> {
    let mut form = vec![
        ("code", code),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("grant_type", "authorization_code"),
    ];
    // Yandex takes the redirect URI from the app registration.
    if provider != MailProvider::Yandex {
        form.push(("redirect_uri", creds.redirect_uri.as_str()));
    }

    let response = http.post(token_url).form(&form).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MailError::Provider {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }

    let tokens: TokenResponse = response.json().await?;
    debug!(provider = %provider, expires_in = tokens.expires_in, "Exchanged OAuth code");
    Ok(tokens)
}

/// Address of the connected mailbox, or `""` when the provider does not say.
pub async fn fetch_user_email(
    http: &reqwest::Client,
    provider: MailProvider,
    access_token: &str,
) -> Result<String, MailError> {
    fetch_user_email_at(http, provider.userinfo_url(), provider, access_token).await
}

async fn fetch_user_email_at(
    http: &reqwest::Client,
    userinfo_url: &str,
    provider: MailProvider,
    access_token: &str,
) -> Result<String, MailError> {
    let info: Value = http
        .get(userinfo_url)
        .header(
            reqwest::header::AUTHORIZATION,
            provider.authorization_header(access_token),
        )
        .send()
        .await?
        .json()
        .await?;

    Ok(info
        .get(provider.email_field())
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}
