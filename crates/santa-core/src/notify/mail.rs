//! Mail channel backed by an HTTP mail relay
//!
//! The relay receives one JSON document per giver:
//!
//! ```json
//! {"from": "santa@example.com", "to": "ann@example.com", "subject": "...", "html": "..."}
//! ```
//!
//! and is expected to answer with any 2xx status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::{debug, info};

use super::{Delivery, Notification, Notifier};
use crate::config::MailConfig;
use crate::error::{Error, Result};

/// Request body posted to the relay
#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Sends each giver's letter to their contact address
#[derive(Clone)]
pub struct MailNotifier {
    http_client: HttpClient,
    relay_url: String,
    from_address: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for MailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailNotifier")
            .field("relay_url", &self.relay_url)
            .field("from_address", &self.from_address)
            .field("api_key", &self.api_key.is_some())
            .finish()
    }
}

impl MailNotifier {
    /// Create a notifier for the given relay
    pub fn new(
        relay_url: impl Into<String>,
        from_address: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::NetworkError)?;

        Ok(Self {
            http_client,
            relay_url: relay_url.into(),
            from_address: from_address.into(),
            api_key,
        })
    }

    /// Build from configuration; the API key comes from the environment
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let (relay_url, from) = config
            .require_delivery_settings()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        let api_key = config
            .resolved_api_key()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Self::new(
            relay_url,
            from,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn send(&self, to: &str, notification: &Notification) -> Result<()> {
        let request = MailRequest {
            from: &self.from_address,
            to,
            subject: notification.subject(),
            html: notification.body(),
        };

        debug!(to = %to, "Sending mail through relay");

        let mut builder = self.http_client.post(&self.relay_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(Error::NetworkError)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DeliveryFailure {
                participant: notification.giver().to_string(),
                reason: format!("relay returned {}: {}", status, body.trim()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    fn channel(&self) -> &'static str {
        "mail"
    }

    async fn deliver(&self, notification: &Notification) -> Result<Delivery> {
        let Some(to) = notification.contact() else {
            return Ok(Delivery::Skipped("no email address".to_string()));
        };

        info!(giver = %notification.giver(), to = %to, "Sending email");

        self.send(to, notification).await.map_err(|e| match e {
            Error::NetworkError(err) => Error::DeliveryFailure {
                participant: notification.giver().to_string(),
                reason: err.to_string(),
            },
            other => other,
        })?;

        Ok(Delivery::Sent(to.to_string()))
    }
}
