pub mod errors;
pub mod log_sink;
pub mod message;
pub mod sink;
pub mod telegram;
pub mod worker;

pub use errors::NotifyError;
pub use log_sink::LogSink;
pub use message::compose;
pub use sink::NotificationSink;
pub use telegram::TelegramSink;
pub use worker::run_notifier;
