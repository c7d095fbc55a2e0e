use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::mail::oauth::MailProvider;
use crate::mail::MailError;

const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";
const BODY_LINE_WIDTH: usize = 76;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SendOutcome {
    fn not_configured(provider: MailProvider) -> Self {
        SendOutcome {
            status: SendStatus::Error,
            data: None,
            message: Some(format!(
                "Sending through {provider} requires SMTP delivery, which is not configured"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Letter<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

/// Encodes a header value as an RFC 2047 encoded-word when it is not plain ASCII.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(value))
    }
}

/// Builds a single-part UTF-8 plain-text message with a base64 body.
pub fn build_mime_message(letter: &Letter<'_>) -> String {
    let encoded = STANDARD.encode(letter.body);
    let body_lines: Vec<&str> = encoded
        .as_bytes()
        .chunks(BODY_LINE_WIDTH)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\n\
         Content-Type: text/plain; charset=\"utf-8\"\r\n\
         Content-Transfer-Encoding: base64\r\n\r\n{}\r\n",
        letter.from,
        letter.to,
        encode_header(letter.subject),
        body_lines.join("\r\n"),
    )
}

/// Sends `letter` from the connected mailbox. Only Gmail delivers; the other
/// providers answer with an error outcome.
pub async fn send_email(
    http: &reqwest::Client,
    provider: MailProvider,
    access_token: &str,
    letter: &Letter<'_>,
) -> Result<SendOutcome, MailError> {
    match provider {
        MailProvider::Google => send_gmail_at(http, GMAIL_SEND_URL, access_token, letter).await,
        MailProvider::Yandex | MailProvider::MailRu => {
            warn!("Mail delivery through {provider} is not configured");
            Ok(SendOutcome::not_configured(provider))
        }
    }
}

async fn send_gmail_at(
    http: &reqwest::Client,
    send_url: &str,
    access_token: &str,
    letter: &Letter<'_>,
) -> Result<SendOutcome, MailError> {
    let raw = URL_SAFE_NO_PAD.encode(build_mime_message(letter));

    let response = http
        .post(send_url)
        .bearer_auth(access_token)
        .json(&json!({ "raw": raw }))
        .send()
        .await?;

    let http_status = response.status();
    let text = response.text().await?;
    let (data, message) = match serde_json::from_str::<Value>(&text) {
        Ok(value) => (Some(value), None),
        Err(_) => (None, Some(text)),
    };

    let status = if http_status.as_u16() == 200 {
        info!("Sent mail to {} through Gmail", letter.to);
        SendStatus::Success
    } else {
        warn!("Gmail refused the message with status {http_status}");
        SendStatus::Error
    };

    Ok(SendOutcome {
        status,
        data,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::testing::spawn_upstream;
    use axum::{http::StatusCode, routing::post, Json, Router};

    fn letter<'a>(subject: &'a str, body: &'a str) -> Letter<'a> {
        Letter {
            from: "hr@acme.com",
            to: "ivan@example.com",
            subject,
            body,
        }
    }

    fn decode_body(message: &str) -> String {
        let (_, body) = message.split_once("\r\n\r\n").unwrap();
        let joined: String = body.split("\r\n").collect();
        String::from_utf8(STANDARD.decode(joined).unwrap()).unwrap()
    }

    #[test]
    fn test_message_headers() {
        let message = build_mime_message(&letter("Interview", "Hello"));
        assert!(message.starts_with("From: hr@acme.com\r\nTo: ivan@example.com\r\nSubject: Interview\r\n"));
        assert!(message.contains("Content-Type: text/plain; charset=\"utf-8\""));
        assert!(message.contains("Content-Transfer-Encoding: base64"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded_word() {
        let message = build_mime_message(&letter("Приглашение на собеседование", "Hi"));
        let subject = message
            .lines()
            .find(|l| l.starts_with("Subject: "))
            .unwrap()
            .trim_end();
        assert!(subject.starts_with("Subject: =?utf-8?B?"));
        assert!(subject.ends_with("?="));
        assert!(subject.is_ascii());
    }

    #[test]
    fn test_body_round_trips_and_wraps() {
        let body = "Здравствуйте! ".repeat(20);
        let message = build_mime_message(&letter("Hi", &body));
        assert_eq!(decode_body(&message), body);

        let (_, encoded) = message.split_once("\r\n\r\n").unwrap();
        assert!(encoded.split("\r\n").all(|line| line.len() <= BODY_LINE_WIDTH));
    }

    #[tokio::test]
    async fn test_other_providers_report_missing_smtp() {
        let outcome = send_email(
            &reqwest::Client::new(),
            MailProvider::Yandex,
            "token",
            &letter("Hi", "Body"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, SendStatus::Error);
        assert!(outcome.message.unwrap().contains("SMTP"));
    }

    #[tokio::test]
    async fn test_gmail_success_and_payload() {
        let router = Router::new().route(
            "/send",
            post(|Json(payload): Json<Value>| async move {
                let raw = payload["raw"].as_str().unwrap_or_default().to_string();
                let decoded = URL_SAFE_NO_PAD.decode(raw).unwrap_or_default();
                let message = String::from_utf8(decoded).unwrap_or_default();
                Json(json!({"id": "msg-1", "to_ok": message.contains("To: ivan@example.com")}))
            }),
        );
        let base = spawn_upstream(router).await;

        let outcome = send_gmail_at(
            &reqwest::Client::new(),
            &format!("{base}/send"),
            "token",
            &letter("Hi", "Body"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, SendStatus::Success);
        let data = outcome.data.unwrap();
        assert_eq!(data["id"], "msg-1");
        assert_eq!(data["to_ok"], true);
    }

    #[tokio::test]
    async fn test_gmail_refusal_is_error_outcome() {
        let router = Router::new().route(
            "/send",
            post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"error": {"code": 401}}))) }),
        );
        let base = spawn_upstream(router).await;

        let outcome = send_gmail_at(
            &reqwest::Client::new(),
            &format!("{base}/send"),
            "expired",
            &letter("Hi", "Body"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, SendStatus::Error);
        assert_eq!(outcome.data.unwrap()["error"]["code"], 401);
    }
}
