use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, instrument};

use crate::command::{Command, StrategyUpdate};
use crate::errors::SettingsError;
use crate::model::Settings;

/// Shared, externally mutated runtime configuration.
///
/// Readers take whole-value snapshots; writers validate on a copy and swap it
/// in, so a rejected command never leaves a half-applied change behind.
#[derive(Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Consistent copy of the current configuration.
    pub fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    /// Applies `cmd` and returns the resulting configuration.
    #[instrument(skip(self), target = "settings")]
    pub fn apply(&self, cmd: &Command) -> Result<Settings, SettingsError> {
        let mut guard = self.inner.write();
        let mut next = guard.clone();

        match cmd {
            Command::Start { target } => {
                if let Some(t) = target {
                    next.target = Some(*t);
                }
            }
            Command::Enable => next.enabled = true,
            Command::Disable => next.enabled = false,
            Command::Status => return Ok(next),
            Command::Set { strategy, update } => {
                let slot = next
                    .strategies
                    .iter_mut()
                    .find(|s| s.name.eq_ignore_ascii_case(strategy))
                    .ok_or_else(|| SettingsError::UnknownStrategy(strategy.clone()))?;

                let mut updated = slot.clone();
                match update {
                    StrategyUpdate::Period(m) => updated.lookback_minutes = *m,
                    StrategyUpdate::Percent(p) => updated.threshold_percent = *p,
                    StrategyUpdate::Cooldown(m) => updated.cooldown_minutes = Some(*m),
                }
                updated.validate()?;
                *slot = updated;
            }
            Command::Filter(filter) => next.universe_filter = *filter,
            Command::Policy(policy) => next.fire_policy = *policy,
        }

        *guard = next.clone();
        info!(command = ?cmd, "settings updated");
        Ok(next)
    }

    /// Parses and applies one line of operator input.
    pub fn handle(&self, text: &str) -> Result<Settings, SettingsError> {
        let cmd = Command::parse(text)?;
        self.apply(&cmd)
    }
}
