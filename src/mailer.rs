//! Outbound-send collaborator. The engine only depends on the [`Mailer`]
//! trait: one send per recipient, success or failure, no retry contract.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail API error {status}: {body}")]
    Api { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// JSON mail API client (SMTP relay services expose this shape).
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    from_address: String,
    api_key: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: String, from_address: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            from_address,
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let message = OutboundMessage {
            from: &self.from_address,
            to,
            subject,
            text: body,
        };

        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, %body, "Mail API rejected the message");
            return Err(MailerError::Api { status, body });
        }

        info!(to, "Outreach email delivered to mail API");
        Ok(())
    }
}

/// Development fallback when no mail API is configured: logs the message
/// and reports success.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailerError> {
        info!(to, subject, "Mail delivery disabled; logging only");
        Ok(())
    }
}
