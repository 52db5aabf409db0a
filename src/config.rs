//! Runtime configuration.

use crate::achievements::{AchievementEngine, Catalog, FileStore, SystemClock};
use crate::constants::{
    ENV_DATA_DIR, ENV_MASTER_PASSWORD, ENV_SPEED_RUN_SECONDS, MASTER_PASSWORD,
    SECRET_RESET_SENTINEL, SPEED_RUN_WINDOW_SECONDS, STORAGE_KEY,
};
use crate::error::Result;
use crate::utils::persistence::data_dir;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the engine and its console.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the store (None = ~/.portfolio)
    pub data_dir: Option<PathBuf>,

    /// Storage key; the store file is `<key>.json`
    pub storage_key: String,

    /// Completing everything faster than this earns the speed-run achievement
    pub speed_run_window: Duration,

    /// Value stored in place of the record list after a qualifying reset
    pub sentinel: String,

    /// Password accepted by the console's master login
    pub master_password: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: STORAGE_KEY.to_string(),
            speed_run_window: Duration::from_secs(SPEED_RUN_WINDOW_SECONDS),
            sentinel: SECRET_RESET_SENTINEL.to_string(),
            master_password: MASTER_PASSWORD.to_string(),
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

impl EngineConfig {
    /// Defaults, overridden by `TROPHIES_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for the
    /// `TROPHIES_*` keys. Unparsable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_SPEED_RUN_SECONDS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.speed_run_window = Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid {}", ENV_SPEED_RUN_SECONDS)
                }
            }
        }
        if let Some(password) = lookup(ENV_MASTER_PASSWORD).filter(|p| !p.is_empty()) {
            config.master_password = password;
        }
        config
    }

    /// The portfolio catalog with this config's speed-run window.
    pub fn catalog(&self) -> Catalog {
        Catalog::portfolio().with_speed_run_window(self.speed_run_window)
    }

    /// The file store this config points at, creating ~/.portfolio if it is
    /// the one in use.
    pub fn file_store(&self) -> Result<FileStore> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::in_dir(dir, &self.storage_key)),
            None => Ok(FileStore::in_dir(&data_dir()?, &self.storage_key)),
        }
    }

    /// Load the engine from the configured file store.
    pub fn open(&self) -> Result<AchievementEngine<FileStore, SystemClock>> {
        Ok(AchievementEngine::load_with_sentinel(
            self.catalog(),
            self.file_store()?,
            SystemClock,
            self.sentinel.clone(),
        ))
    }
}
