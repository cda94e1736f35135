pub mod command;
pub mod errors;
pub mod model;
pub mod status;
pub mod store;

pub use command::{Command, StrategyUpdate};
pub use errors::SettingsError;
pub use model::{ChatId, FirePolicy, Settings};
pub use store::SettingsStore;
