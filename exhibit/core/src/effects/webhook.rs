//! Webhook Effect Client
//!
//! Fires triggers as plain HTTP GET requests. The URL is built from a
//! template in which `{trigger}` is replaced by the trigger name, e.g.
//!
//! ```text
//! https://maker.ifttt.com/trigger/{trigger}/json/with/key/<key>
//! ```
//!
//! A template without a placeholder is treated as a base URL and the trigger
//! name is appended as the last path segment.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{EffectClient, EffectError, EffectTrigger};

/// Placeholder replaced by the trigger name
pub const TRIGGER_PLACEHOLDER: &str = "{trigger}";

/// HTTP webhook client
#[derive(Clone, Debug)]
pub struct WebhookClient {
    /// URL template
    url_template: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl WebhookClient {
    /// Create a client for `url_template` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Client`] if the HTTP client cannot be built.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, EffectError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EffectError::Client)?;

        Ok(Self {
            url_template: url_template.into(),
            http_client,
        })
    }

    /// URL for a trigger
    #[must_use]
    pub fn url_for(&self, trigger: EffectTrigger) -> String {
        if self.url_template.contains(TRIGGER_PLACEHOLDER) {
            self.url_template
                .replace(TRIGGER_PLACEHOLDER, trigger.name())
        } else {
            format!(
                "{}/{}",
                self.url_template.trim_end_matches('/'),
                trigger.name()
            )
        }
    }
}

#[async_trait]
impl EffectClient for WebhookClient {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn trigger(&self, trigger: EffectTrigger) -> Result<(), EffectError> {
        let url = self.url_for(trigger);
        tracing::debug!(trigger = %trigger, "Firing webhook");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|source| EffectError::Request {
                trigger: trigger.name(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(EffectError::Status {
                trigger: trigger.name(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
