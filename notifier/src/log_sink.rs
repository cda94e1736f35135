use async_trait::async_trait;
use settings::ChatId;
use tracing::info;

use crate::errors::NotifyError;
use crate::sink::NotificationSink;

/// Dry-run sink: writes every alert to the log instead of a chat.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, target: ChatId, message: &str) -> Result<(), NotifyError> {
        info!(chat_id = target, %message, "alert");
        Ok(())
    }
}
