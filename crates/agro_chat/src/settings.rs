//! Workspace settings for the assistant.
//!
//! Settings live in `.agro/settings.json` under a workspace directory. A
//! missing file means defaults. The API key is never stored here; the file
//! only names the environment variable that holds it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};
use crate::gemini::{API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variable overriding the configured model
pub const MODEL_ENV: &str = "AGRO_LLM_MODEL";

/// Default bound on a single provider call
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Assistant settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSettings {
    /// Model name passed to the provider
    pub default_model: String,
    /// Provider API root
    pub api_base_url: String,
    /// Seconds to wait for a reply; 0 waits indefinitely
    pub request_timeout_secs: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_env: API_KEY_ENV.to_string(),
        }
    }
}

impl ChatSettings {
    /// Location of the settings file inside a workspace
    pub fn settings_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(".agro").join("settings.json")
    }

    /// Load settings for a workspace, falling back to defaults.
    pub fn load(workspace_root: &Path) -> SettingsResult<Self> {
        Self::load_from_path(&Self::settings_path(workspace_root))
    }

    pub fn load_from_path(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `AGRO_LLM_MODEL` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        let model = std::env::var(MODEL_ENV).ok();
        self.with_model(model)
    }

    /// Replace the model when `model` names one.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.default_model = model;
        }
        self
    }

    /// Replace the request timeout when one is given.
    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.request_timeout_secs = secs;
        }
        self
    }

    /// Bound for one provider call, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
