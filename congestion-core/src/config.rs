use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable overriding the stored API key.
pub const API_KEY_ENV: &str = "SEOUL_API_KEY";
/// Environment variable overriding the stored base URL.
pub const BASE_URL_ENV: &str = "SEOUL_API_BASE_URL";

/// Settings for the Seoul Open API `citydata` service.
///
/// Every value is substituted verbatim as a path segment:
/// `{base_url}/{api_key}/{request_type}/{service_name}/{start_index}/{end_index}/{area}`.
///
/// Example TOML:
/// ```toml
/// base_url = "http://openapi.seoul.go.kr:8088"
/// api_key = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_type: String,
    pub service_name: String,
    pub start_index: String,
    pub end_index: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://openapi.seoul.go.kr:8088".to_string(),
            api_key: String::new(),
            request_type: "json".to_string(),
            service_name: "citydata".to_string(),
            start_index: "1".to_string(),
            end_index: "5".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "seoul-congestion", "congestion-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `SEOUL_API_KEY` / `SEOUL_API_BASE_URL` on top of the loaded values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(env::var(API_KEY_ENV).ok(), env::var(BASE_URL_ENV).ok())
    }

    /// Blank overrides are ignored.
    pub fn with_overrides(mut self, api_key: Option<String>, base_url: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = api_key;
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Returns the API key, or an error with a hint on how to set one.
    pub fn require_api_key(&self) -> Result<&str> {
        if !self.has_api_key() {
            return Err(anyhow!(
                "No Seoul Open API key configured.\n\
                 Hint: run `congestion configure` or set {API_KEY_ENV}."
            ));
        }
        Ok(self.api_key.as_str())
    }
}
