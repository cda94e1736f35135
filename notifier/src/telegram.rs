use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use settings::ChatId;
use tracing::{debug, instrument};

use crate::errors::NotifyError;
use crate::sink::NotificationSink;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Bot API envelope; only `ok` and `description` matter here.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API sink (`sendMessage`, HTML parse mode).
#[derive(Clone)]
pub struct TelegramSink {
    http: Client,
    endpoint: String,
}

impl TelegramSink {
    pub fn new(base_url: &str, bot_token: &str) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: send_message_url(base_url, bot_token),
        })
    }
}

fn send_message_url(base_url: &str, bot_token: &str) -> String {
    format!("{}/bot{}/sendMessage", base_url.trim_end_matches('/'), bot_token)
}

#[async_trait]
impl NotificationSink for TelegramSink {
    #[instrument(skip(self, message), level = "debug")]
    async fn send(&self, target: ChatId, message: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: target,
            text: message,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // The Bot API reports rejections in the body, often with a 4xx status,
        // so the envelope is decoded before looking at the status code.
        let resp: ApiResponse = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            return Err(NotifyError::Rejected {
                description: resp.description.unwrap_or_else(|| "no description".into()),
            });
        }

        debug!("telegram message delivered");
        Ok(())
    }
}
