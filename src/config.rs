//! Configuration handling for the sign-up form

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::{Debouncer, PatchPolicy};

/// User configuration for the sign-up form
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignupConfig {
    /// Quiet period before the email message is recomputed, in milliseconds
    pub debounce_ms: Option<u64>,
    /// How partial updates treat unknown field names
    pub patch_policy: Option<PatchPolicy>,
    /// Directory receiving saved submissions; log-only when unset
    pub save_dir: Option<String>,
}

impl SignupConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "customer-signup", "customer-signup")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: SignupConfig = serde_json::from_str(&content)?;
            return Ok(config);
        }

        Ok(Self::default())
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(Debouncer::DEFAULT_DELAY)
    }

    pub fn patch_policy(&self) -> PatchPolicy {
        self.patch_policy.unwrap_or_default()
    }
}
