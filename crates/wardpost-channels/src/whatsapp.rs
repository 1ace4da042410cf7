//! WhatsApp Business Cloud API messenger.
//!
//! Uses the official WhatsApp Business Platform (Cloud API) for messaging.
//! Requires: Access Token + Phone Number ID from Meta Business Suite.
//!
//! The surface the original operators drove needed fixed waits before and
//! after each interaction. That readiness discipline lives here, inside
//! `send`: callers see one slow call, never the pauses themselves.

use async_trait::async_trait;
use std::time::Duration;
use wardpost_core::config::WhatsAppConfig;
use wardpost_core::error::{Result, WardpostError};
use wardpost_core::messenger::Messenger;

/// WhatsApp Cloud API messenger.
pub struct WhatsAppMessenger {
    config: WhatsAppConfig,
    client: reqwest::Client,
    connected: bool,
}

impl WhatsAppMessenger {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            connected: false,
        }
    }

    /// Send a text message via WhatsApp Cloud API.
    async fn send_text_message(&self, to: &str, text: &str) -> Result<String> {
        let url = format!(
            "https://graph.facebook.com/v21.0/{}/messages",
            self.config.phone_number_id
        );

        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": text
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| WardpostError::Channel(format!("WhatsApp API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(WardpostError::Channel(format!(
                "WhatsApp API error {}: {}",
                status, error_text
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WardpostError::Channel(format!("Invalid WhatsApp response: {e}")))?;

        let msg_id = result["messages"][0]["id"]
            .as_str()
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!("WhatsApp message sent: {} → {}", msg_id, to);
        Ok(msg_id)
    }

    /// Readiness wait before touching the surface.
    async fn settle_before(&self) {
        if self.config.settle_before_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_before_ms)).await;
        }
    }

    /// Settle pause after the surface accepted a message.
    async fn settle_after(&self) {
        if self.config.settle_after_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_after_ms)).await;
        }
    }
}

#[async_trait]
impl Messenger for WhatsAppMessenger {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn connect(&mut self) -> Result<()> {
        if self.config.access_token.is_empty() {
            return Err(WardpostError::Config(
                "WhatsApp access_token not configured".into(),
            ));
        }
        if self.config.phone_number_id.is_empty() {
            return Err(WardpostError::Config(
                "WhatsApp phone_number_id not configured".into(),
            ));
        }

        // Verify token by checking the phone number
        let url = format!(
            "https://graph.facebook.com/v21.0/{}",
            self.config.phone_number_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .send()
            .await
            .map_err(|e| WardpostError::Channel(format!("WhatsApp verification failed: {e}")))?;

        if response.status().is_success() {
            self.connected = true;
            tracing::info!(
                "WhatsApp Business: connected (phone_id={})",
                self.config.phone_number_id
            );
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(WardpostError::Channel(format!(
                "WhatsApp token verification failed: {}",
                text
            )))
        }
    }

    async fn send(&self, target: &str, text: &str) -> Result<()> {
        self.settle_before().await;
        self.send_text_message(target, text).await?;
        self.settle_after().await;
        Ok(())
    }
}
