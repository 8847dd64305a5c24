use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving one log file per process start.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to write the log file at all.
    #[serde(default = "default_true")]
    pub file_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
            file_enabled: true,
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/mnt/cwm-logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
