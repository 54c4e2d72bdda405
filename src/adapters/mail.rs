use crate::core::templates::{render, MailIdentity};
use crate::core::{EmailTemplate, Notifier, Record};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Logs rendered messages instead of sending them. Used when no mail
/// relay is configured.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    identity: MailIdentity,
}

impl LogNotifier {
    pub fn new(identity: MailIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, template: EmailTemplate, recipient: &str, data: &Record) -> Result<()> {
        let message = render(template, recipient, data, &self.identity);
        tracing::info!(
            "📧 (not sent) {} -> {}: {}",
            message.from,
            message.to,
            message.subject
        );
        tracing::debug!("Message body:\n{}", message.html);
        Ok(())
    }
}

/// Hands rendered messages to an HTTP mail relay as JSON.
#[derive(Debug, Clone)]
pub struct RelayNotifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
    identity: MailIdentity,
}

impl RelayNotifier {
    pub fn new(endpoint: String, token: Option<String>, identity: MailIdentity) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            client,
            endpoint,
            token,
            identity,
        })
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn notify(&self, template: EmailTemplate, recipient: &str, data: &Record) -> Result<()> {
        let message = render(template, recipient, data, &self.identity);

        tracing::debug!("Posting {:?} for {} to mail relay {}", template, recipient, self.endpoint);
        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| SiteError::NotificationError {
            message: format!("mail relay unreachable: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteError::NotificationError {
                message: format!("mail relay returned {status}: {body}"),
            });
        }

        Ok(())
    }
}
