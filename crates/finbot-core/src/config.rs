use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default simulated typing latency between a submission and its reply.
pub const DEFAULT_TYPING_DELAY_MS: u64 = 1000;

/// Default display name of the assistant.
pub const DEFAULT_ASSISTANT_NAME: &str = "FinBot";

/// Root configuration, read from `config.toml`.
///
/// Every field is optional in the file; missing fields fall back to defaults.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FinbotConfig {
    /// Simulated "typing" delay before the assistant replies.
    pub typing_delay_ms: u64,
    /// Name shown next to assistant messages.
    pub assistant_name: String,
    /// Optional TOML file replacing the builtin response tables.
    pub tables_path: Option<PathBuf>,
    /// Directory for the budget snapshot. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for FinbotConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            tables_path: None,
            data_dir: None,
            log_filter: None,
        }
    }
}

impl FinbotConfig {
    pub fn typing_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.typing_delay_ms)
    }
}
