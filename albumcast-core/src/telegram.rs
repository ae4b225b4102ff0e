use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Duration;

use crate::announcer::{Channel, MessageOptions};
use crate::error::{RelayError, Result};
use crate::http::read_body;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API client bound to a single chat.
#[derive(Clone)]
pub struct TelegramBot {
    client: Client,
    token: String,
    chat_id: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    description: Option<String>,
    error_code: Option<u16>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

impl TelegramBot {
    pub fn new(client: Client, token: String, chat_id: String) -> Self {
        Self {
            client,
            token,
            chat_id,
            api_url: TELEGRAM_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call(&self, method: &'static str, payload: Value) -> Result<()> {
        // The URL embeds the token, so only the method name is logged.
        tracing::debug!("Telegram {} to chat {}", method, self.chat_id);

        let response = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::network(method, e))?;

        let (status, body) = read_body(method, response).await?;
        check_response(method, status, &body)
    }
}

fn check_response(method: &'static str, status: u16, body: &str) -> Result<()> {
    let success = (200..300).contains(&status);
    match serde_json::from_str::<BotResponse>(body) {
        Ok(BotResponse { ok: true, .. }) if success => Ok(()),
        Ok(response) => {
            let code = response
                .error_code
                .unwrap_or(if success { 400 } else { status });
            let retry_after = response
                .parameters
                .and_then(|p| p.retry_after)
                .map(Duration::from_secs);
            let message = response
                .description
                .unwrap_or_else(|| "no description".to_string());
            Err(RelayError::from_status(method, code, message, retry_after))
        }
        Err(_) if success => Err(RelayError::rejected(
            method,
            format!("unexpected response: {body}"),
        )),
        Err(_) => Err(RelayError::from_status(method, status, body, None)),
    }
}

#[async_trait]
impl Channel for TelegramBot {
    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<()> {
        self.call(
            "sendPhoto",
            json!({ "chat_id": self.chat_id, "photo": photo_url, "caption": caption }),
        )
        .await
    }

    async fn send_video(&self, video_url: &str, caption: &str) -> Result<()> {
        self.call(
            "sendVideo",
            json!({ "chat_id": self.chat_id, "video": video_url, "caption": caption }),
        )
        .await
    }

    async fn send_message(&self, text: &str, options: MessageOptions) -> Result<()> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": self.chat_id,
                "text": text,
                "disable_web_page_preview": options.disable_preview,
                "disable_notification": options.silent,
            }),
        )
        .await
    }
}
