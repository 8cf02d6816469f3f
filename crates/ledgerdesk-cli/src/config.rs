//! CLI configuration.
//!
//! Settings come from command-line flags (with environment fallbacks), then
//! from an optional `config.json` in the platform config directory:
//!
//! ```json
//! { "api_url": "https://api.example.com", "entry_path": "/login", "timeout_secs": 20 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use ledgerdesk_core::{ApiUrl, ClientConfig, SessionKind};

const CONFIG_FILE: &str = "config.json";

/// Contents of the optional config file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub entry_path: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Resolved settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kind: SessionKind,
    pub api_url: Option<String>,
    pub store_dir: PathBuf,
    pub entry_path: Option<String>,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Resolve flags against the config file in the platform config dir.
    pub fn resolve(
        kind: SessionKind,
        base_url: Option<String>,
        store_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "ledgerdesk");

        let file = match &dirs {
            Some(dirs) => FileConfig::load_from(&dirs.config_dir().join(CONFIG_FILE))?,
            None => FileConfig::default(),
        };

        let store_dir = match store_dir {
            Some(dir) => dir,
            None => dirs
                .as_ref()
                .map(|d| d.data_dir().join("sessions"))
                .context("Could not determine data directory; pass --store-dir")?,
        };

        Ok(Self::merge(kind, base_url, store_dir, file))
    }

    fn merge(
        kind: SessionKind,
        base_url: Option<String>,
        store_dir: PathBuf,
        file: FileConfig,
    ) -> Self {
        Self {
            kind,
            api_url: base_url.or(file.api_url),
            store_dir,
            entry_path: file.entry_path,
            timeout: file.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Build the client configuration for the selected session kind.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let raw = self
            .api_url
            .as_deref()
            .context("No API URL configured. Pass --base-url or set LEDGERDESK_API_URL.")?;
        let api_url = ApiUrl::new(raw).context("Invalid API URL")?;

        let mut config = ClientConfig::for_kind(self.kind, api_url);
        if let Some(entry) = &self.entry_path {
            config = config.with_entry_path(entry.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        Ok(config)
    }
}
