//! Runtime configuration
//!
//! Settings come from an optional TOML file, then environment variables,
//! then command-line flags (applied by the binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::analysis::PaginationPolicy;
use crate::core::error::{Error, Result};
use crate::view::ColumnPolicy;

/// Environment variable overriding [`Config::backend_url`]
pub const BACKEND_URL_ENV: &str = "ELEMENTS_BACKEND_URL";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
const DEFAULT_API_PREFIX: &str = "/api/rest";
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the Elements backend, without the API prefix
    pub backend_url: String,
    /// Path prefix of the REST API on the backend
    pub api_prefix: String,
    /// File path or URL of the OpenAPI document; derived from the backend when unset
    pub spec_source: Option<String>,
    /// Rows requested per list page
    pub page_size: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    pub pagination: PaginationPolicy,
    pub columns: ColumnPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            spec_source: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            pagination: PaginationPolicy::default(),
            columns: ColumnPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file silently falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default_path) if default_path.is_file() => Self::from_file(&default_path)?,
                _ => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location (`<config dir>/elements-admin/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("elements-admin").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.backend_url()?;
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than zero"));
        }
        if self.columns.max_columns == 0 {
            return Err(Error::config("columns.max_columns must be greater than zero"));
        }
        Ok(())
    }

    pub fn backend_url(&self) -> Result<Url> {
        Ok(Url::parse(self.backend_url.trim_end_matches('/'))?)
    }

    /// Source of the OpenAPI document, defaulting to the backend's published YAML
    pub fn spec_source(&self) -> String {
        self.spec_source.clone().unwrap_or_else(|| {
            format!(
                "{}{}/openapi.yaml",
                self.backend_url.trim_end_matches('/'),
                self.api_prefix
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
