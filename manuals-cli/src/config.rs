//! CLI configuration management
//!
//! Handles loading and saving the `.manuals.yaml` configuration file and
//! merging it with environment variables and command-line flags.

use anyhow::{Context, Result};
use manuals_core::ManualsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = ".manuals.yaml";

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "MANUALS_API_URL";
/// Environment variable carrying the API key
pub const ENV_API_KEY: &str = "MANUALS_API_KEY";
/// Environment variable overriding the output format
pub const ENV_OUTPUT_FORMAT: &str = "MANUALS_OUTPUT_FORMAT";

/// CLI configuration
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CliConfig {
    /// Base URL of the Manuals API
    pub api_url: String,

    /// API key for authentication
    pub api_key: String,

    /// Output format: table, json or text
    pub output_format: String,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            output_format: "table".to_string(),
            config_file: None,
        }
    }
}

impl CliConfig {
    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check that an API key is present.
    pub fn require_api_key(&self) -> manuals_core::Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ManualsError::validation(format!(
                "API key required: set {} or add api_key to config file",
                ENV_API_KEY
            )));
        }
        Ok(())
    }

    /// API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        match chars.len() {
            0 => "(not set)".to_string(),
            n if n <= 4 => "*".repeat(n),
            n => format!(
                "{}{}",
                "*".repeat(n - 4),
                chars[n - 4..].iter().collect::<String>()
            ),
        }
    }

    /// Candidate configuration files, in lookup order.
    ///
    /// `~/.manuals.yaml`, `./.manuals.yaml`, then
    /// `$XDG_CONFIG_HOME/manuals/.manuals.yaml` (or `~/.config/manuals/`).
    pub fn search_paths() -> Vec<PathBuf> {
        let home = dirs::home_dir();
        let mut paths = Vec::new();

        if let Some(home) = &home {
            paths.push(home.join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from(".").join(CONFIG_FILE_NAME));

        let xdg = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| home.map(|h| h.join(".config")));
        if let Some(xdg) = xdg {
            paths.push(xdg.join("manuals").join(CONFIG_FILE_NAME));
        }

        paths
    }

    /// First existing configuration file, if any.
    pub fn find_config_file() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.is_file())
    }

    /// File written by `config set` and `config reset`: `~/.manuals.yaml`.
    pub fn user_config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))
    }
}

/// Configuration as stored on disk. Absent keys leave lower layers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl FileConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the file if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Set a single key by name.
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "api_url" => {
                ConfigBuilder::validate_url(&value)?;
                self.api_url = Some(value);
            }
            "api_key" => self.api_key = Some(value),
            "output_format" => self.output_format = Some(value),
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown config key: {} (expected api_url, api_key or output_format)",
                    key
                ))
            }
        }
        Ok(())
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Each layer overrides the values set by the layers before it:
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    api_url: Option<String>,
    api_key: Option<String>,
    output_format: Option<String>,
    config_file: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API URL (with validation)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.api_url = Some(url);
        Ok(self)
    }

    /// Set API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set output format
    ///
    /// Not validated: unknown formats render as tables.
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    /// Apply values from a configuration file.
    ///
    /// An explicit `path` must exist. Without one, the first file found in
    /// [`CliConfig::search_paths`] is used; finding none is not an error.
    pub fn with_config_file(mut self, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(anyhow::anyhow!(
                        "Config file not found: {}",
                        path.display()
                    ));
                }
                path.to_path_buf()
            }
            None => match CliConfig::find_config_file() {
                Some(path) => path,
                None => return Ok(self),
            },
        };

        let file = FileConfig::load(&path)?;
        tracing::debug!("Loaded configuration from {}", path.display());

        if let Some(url) = file.api_url {
            self = self.with_api_url(url)?;
        }
        if let Some(key) = file.api_key {
            self.api_key = Some(key);
        }
        if let Some(format) = file.output_format {
            self.output_format = Some(format);
        }
        self.config_file = Some(path);

        Ok(self)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_API_URL) {
            // Invalid values are ignored rather than fatal
            if Self::validate_url(&url).is_ok() {
                self.api_url = Some(url);
            } else {
                tracing::warn!("Ignoring invalid {}: {}", ENV_API_URL, url);
            }
        }

        if let Some(key) = non_empty_env(ENV_API_KEY) {
            self.api_key = Some(key);
        }

        if let Some(format) = non_empty_env(ENV_OUTPUT_FORMAT) {
            self.output_format = Some(format);
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let api_url = self.api_url.unwrap_or(defaults.api_url);
        Self::validate_url(&api_url)?;

        Ok(CliConfig {
            api_url,
            api_key: self.api_key.unwrap_or(defaults.api_key),
            output_format: self.output_format.unwrap_or(defaults.output_format),
            config_file: self.config_file,
        })
    }

    /// Validate URL format
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("API URL cannot be empty"));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!("API URL must start with http:// or https://"));
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
