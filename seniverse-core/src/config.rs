use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::scheme::AuthScheme;

pub const DEFAULT_BASE_URL: &str = "https://api.seniverse.com/v3";

/// Largest `default_days` the provider accepts.
pub const MAX_DAYS: u32 = 31;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "https://api.seniverse.com/v3"
/// private_key = "..."
/// public_key = "..."
/// auth_scheme = "public"
/// default_days = 3
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,

    /// Needed by both schemes: sent in clear (private) or used as HMAC key (public).
    pub private_key: String,

    /// Only used by the public scheme.
    pub public_key: String,

    pub auth_scheme: AuthScheme,

    /// Days requested when the user gives none.
    pub default_days: u32,

    pub timeout_secs: u64,

    /// City list CSV; the bundled list is used when unset.
    pub gazetteer: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            private_key: String::new(),
            public_key: String::new(),
            auth_scheme: AuthScheme::default(),
            default_days: 3,
            timeout_secs: 10,
            gazetteer: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("private_key", &redacted(&self.private_key))
            .field("public_key", &redacted(&self.public_key))
            .field("auth_scheme", &self.auth_scheme)
            .field("default_days", &self.default_days)
            .field("timeout_secs", &self.timeout_secs)
            .field("gazetteer", &self.gazetteer)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl Config {
    /// Check bounds and required credentials for the selected scheme.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.default_days > MAX_DAYS {
            bail!("default_days must be between 0 and {MAX_DAYS}, got {}", self.default_days);
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be positive");
        }
        if self.private_key.is_empty() {
            bail!(
                "No private key configured (required for both schemes).\n\
                 Hint: run `weather configure` first."
            );
        }
        if self.auth_scheme == AuthScheme::Public && self.public_key.is_empty() {
            bail!(
                "The public scheme needs a public key.\n\
                 Hint: run `weather configure` or set auth_scheme = \"private\"."
            );
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "seniverse", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
