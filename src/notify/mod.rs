use async_trait::async_trait;
use tracing::{info, warn};

/// Send-and-forget sink for user-facing alerts. The poll pipeline fires
/// these and moves on; it never waits on an acknowledgement.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, text: &str);
}

/// Telegram notification client. If token/chat_id are missing, all sends are
/// no-ops.
pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new() -> Self {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .filter(|s| !s.is_empty());

        if bot_token.is_some() && chat_id.is_some() {
            info!("Telegram notifications enabled");
        } else {
            info!("Telegram notifications disabled (missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID)");
        }

        Self {
            bot_token,
            chat_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

impl Default for TelegramNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Send a message. Silently skips if not configured; delivery failures
    /// are logged, never surfaced to the poll loop.
    async fn notify(&self, title: &str, text: &str) {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return;
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": format!("<b>{}</b>\n{}", html_escape(title), html_escape(text)),
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        });

        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if !resp.status().is_success() => {
                warn!("Telegram API error: {}", resp.status());
            }
            Err(e) => {
                warn!("Telegram send failed: {}", e);
            }
            _ => {}
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
pub(crate) struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, text: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), text.to_string()));
    }
}
