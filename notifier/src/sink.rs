use async_trait::async_trait;
use settings::ChatId;

use crate::errors::NotifyError;

/// Delivers a composed alert to the operator's channel.
///
/// Implementations must not retry internally; the worker logs the failure
/// and moves on to the next alert.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn send(&self, target: ChatId, message: &str) -> Result<(), NotifyError>;
}
