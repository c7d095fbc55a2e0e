use anyhow::{Context, Result};

use crate::mail::oauth::MailProvider;

/// Application configuration loaded from environment variables.
/// Fails at startup if `OPENAI_API_KEY` is missing; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    pub hh_api_base: String,
    pub hh_oauth_base: String,
    /// Public URL of the web app; OAuth callbacks redirect back here.
    pub webapp_url: String,
    pub static_dir: String,
    pub mail: MailConfig,
    pub port: u16,
    pub rust_log: String,
}

/// OAuth client registration for a single mail provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub google: ProviderCredentials,
    pub yandex: ProviderCredentials,
    pub mailru: ProviderCredentials,
}

impl MailConfig {
    pub fn credentials(&self, provider: MailProvider) -> &ProviderCredentials {
        match provider {
            MailProvider::Google => &self.google,
            MailProvider::Yandex => &self.yandex,
            MailProvider::MailRu => &self.mailru,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite:hr_assistant.db?mode=rwc"),
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_timeout_secs: env_or("OPENAI_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("OPENAI_TIMEOUT_SECS must be a whole number of seconds")?,
            hh_api_base: env_or("HH_API_BASE", "https://api.hh.ru")
                .trim_end_matches('/')
                .to_string(),
            hh_oauth_base: env_or("HH_OAUTH_BASE", "https://hh.ru")
                .trim_end_matches('/')
                .to_string(),
            webapp_url: env_or("WEBAPP_URL", "http://localhost:8000")
                .trim_end_matches('/')
                .to_string(),
            static_dir: env_or("STATIC_DIR", "static"),
            mail: MailConfig {
                google: provider_from_env("GOOGLE"),
                yandex: provider_from_env("YANDEX"),
                mailru: provider_from_env("MAILRU"),
            },
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn provider_from_env(prefix: &str) -> ProviderCredentials {
    ProviderCredentials {
        client_id: env_or(&format!("{prefix}_CLIENT_ID"), ""),
        client_secret: env_or(&format!("{prefix}_CLIENT_SECRET"), ""),
        redirect_uri: env_or(&format!("{prefix}_REDIRECT_URI"), ""),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
impl Config {
    /// Config pointing every upstream at an unroutable address, for router tests.
    pub fn for_tests(database_url: &str) -> Self {
        Config {
            database_url: database_url.to_string(),
            openai_api_key: "test-key".to_string(),
            openai_base_url: "http://127.0.0.1:9/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_timeout_secs: 1,
            hh_api_base: "http://127.0.0.1:9".to_string(),
            hh_oauth_base: "http://127.0.0.1:9".to_string(),
            webapp_url: "http://localhost:8000".to_string(),
            static_dir: "static".to_string(),
            mail: MailConfig::default(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
