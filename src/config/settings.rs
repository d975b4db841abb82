use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LeaseLensError, Result};
use crate::flags::StaticFlags;
use crate::storage::HISTORY_SLOT;
use crate::upload::{UploadPolicy, DEFAULT_MAX_UPLOAD_MB};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/analyze";

/// Settings from `config.yml` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analysis service URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds. Default: 300.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted upload in megabytes. Default: 10.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    /// History file. Defaults to `lease-lens-history.json` in the config directory.
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    /// Feature flag values.
    #[serde(default)]
    pub flags: HashMap<String, bool>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_request_timeout() -> u64 {
    300
}
fn default_max_upload_mb() -> u64 {
    DEFAULT_MAX_UPLOAD_MB
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            max_upload_mb: default_max_upload_mb(),
            history_file: None,
            flags: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from a YAML file. Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| LeaseLensError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `config.yml` from the config directory and apply env overrides.
    pub fn load() -> Result<Self> {
        let path = super::dirs_global().join("config.yml");
        let mut config = Self::load_from(&path)?;
        if let Ok(endpoint) = std::env::var("LEASE_LENS_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint;
            }
        }
        Ok(config)
    }

    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| super::dirs_global().join(format!("{HISTORY_SLOT}.json")))
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::with_max_mb(self.max_upload_mb)
    }

    pub fn feature_flags(&self) -> StaticFlags {
        StaticFlags::new(self.flags.clone()).with_env_overrides()
    }
}
