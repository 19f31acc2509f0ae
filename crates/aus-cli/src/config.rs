//! CLI configuration
//!
//! Values are layered: built-in defaults, then the TOML file, then the
//! environment, then command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use aus_ocm::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};

/// Overrides [`CliConfig::api_url`]
pub const ENV_API_URL: &str = "AUS_API_URL";
/// Overrides [`CliConfig::token`]
pub const ENV_TOKEN: &str = "AUS_TOKEN";
/// Token fallback shared with other OCM tooling
pub const ENV_OCM_TOKEN: &str = "OCM_TOKEN";
/// Overrides [`CliConfig::organization_id`]
pub const ENV_ORG_ID: &str = "AUS_ORG_ID";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// OCM API URL
    pub api_url: String,
    /// Bearer token
    pub token: Option<String>,
    /// Organization used when `--org-id` is not given
    pub organization_id: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            organization_id: None,
            timeout_secs: None,
        }
    }
}

impl CliConfig {
    /// With API URL
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// With token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// With default organization
    #[must_use]
    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// With request timeout
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Default location of the configuration file
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aus").join("config.toml"))
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns an error if the document is not valid TOML or has unknown types
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Load configuration from `path`, or from [`Self::default_path`]
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("can't read configuration {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Apply environment overrides using `var` to look variables up
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).filter(|value| !value.trim().is_empty());
        if let Some(api_url) = var(ENV_API_URL) {
            self.api_url = api_url;
        }
        if let Some(token) = var(ENV_TOKEN).or_else(|| var(ENV_OCM_TOKEN)) {
            self.token = Some(token);
        }
        if let Some(organization_id) = var(ENV_ORG_ID) {
            self.organization_id = Some(organization_id);
        }
        self
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env(|name| std::env::var(name).ok())
    }

    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    /// Token, empty if none is configured
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }
}
