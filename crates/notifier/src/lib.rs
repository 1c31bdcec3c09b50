// In crates/notifier/src/lib.rs

use app_config::types::TelegramSettings;
use async_trait::async_trait;

pub mod error;

// Re-export public types
pub use error::{Error, Result};

/// The universal interface for an outbound notification sink.
///
/// A sink receives already-formatted text. Callers log and swallow a failed
/// send; it never aborts a polling cycle.
#[async_trait]
pub trait Notify: Send + Sync {
    /// The name of the sink (e.g., "Telegram").
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str) -> Result<()>;
}

/// Sends messages to a Telegram chat via the Bot API.
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: settings.api_base_url.clone(),
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Notify for TelegramNotifier {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        if !response.status().is_success() {
            return Err(Error::Rejected {
                status: response.status().as_u16(),
            });
        }

        tracing::debug!(chars = text.len(), "Telegram message delivered");
        Ok(())
    }
}
