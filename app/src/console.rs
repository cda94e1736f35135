//! Operator console: one command per stdin line, answered on stdout.

use settings::SettingsStore;
use settings::status::render_status;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

pub async fn run_console(settings: SettingsStore) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                println!("{}", reply(&settings, &line));
            }
            Ok(None) => {
                debug!("stdin closed; console stopped");
                break;
            }
            Err(e) => {
                warn!(error = %e, "console read failed");
                break;
            }
        }
    }
}

/// Applies one command and renders the answer: the resulting settings, or
/// why the command was rejected.
pub fn reply(settings: &SettingsStore, line: &str) -> String {
    match settings.handle(line) {
        Ok(current) => render_status(&current),
        Err(e) => format!("rejected: {e}"),
    }
}
