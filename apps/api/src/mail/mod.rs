//! Recruiter mailbox integration: OAuth connection of a Google, Yandex or
//! Mail.ru account and outbound mail to candidates.

pub mod handlers;
pub mod oauth;
pub mod send;

use thiserror::Error;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("unknown mail provider: {0}")]
    UnknownProvider(String),

    #[error("mailbox not connected")]
    NotConnected,

    #[error("mail provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail provider returned {status}: {message}")]
    Provider { status: u16, message: String },
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::UnknownProvider(_) | MailError::NotConnected => {
                AppError::Validation(err.to_string())
            }
            MailError::Http(e) => AppError::Http(e),
            MailError::Provider { status, message } => AppError::Upstream { status, message },
        }
    }
}
