//! Application configuration loaded via OrthoConfig.
//!
//! Values layer from defaults, a config file, `FAMEALY_*` environment
//! variables, and command-line flags, in increasing precedence.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_POLL_INTERVAL;

const DEFAULT_DATA_DIR: &str = "famealy-data";

/// Settings controlling storage, polling, and logging.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FAMEALY")]
pub struct FamealySettings {
    /// Directory holding the persisted collections.
    pub data_dir: Option<String>,
    /// Seconds between family member refreshes on the dashboard.
    pub poll_interval_secs: Option<u64>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub json_logs: bool,
    /// Hold new local accounts until their email is confirmed.
    #[ortho_config(default = false)]
    pub require_email_confirmation: bool,
}

impl FamealySettings {
    /// Configured data directory, falling back to `famealy-data`.
    pub fn data_dir(&self) -> Utf8PathBuf {
        self.data_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map_or_else(|| Utf8PathBuf::from(DEFAULT_DATA_DIR), Utf8PathBuf::from)
    }

    /// Configured poll interval; missing or zero means three seconds.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs)
    }
}
