use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the backend base URL
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the backend public API key
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
/// Environment variable relocating the configuration directory
pub const CONFIG_DIR_ENV: &str = "MK_TRAINING_CONFIG_DIR";

/// Startup configuration problems. These are the only process-fatal errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Backend URL is not configured (set SUPABASE_URL or backend.url)")]
    MissingBackendUrl,

    #[error("Backend API key is not configured (set SUPABASE_ANON_KEY or backend.anon_key)")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub ui: UiConfig,

    /// File this configuration was loaded from; saves go back there.
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,
}

/// Persisted session issued by the backend auth service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// The single persisted UI preference
    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            auth: AuthConfig::default(),
            ui: UiConfig::default(),
            source: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            date_format: default_date_format(),
        }
    }
}

impl BackendConfig {
    /// Check that both halves of the backend address are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingBackendUrl);
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

impl Config {
    /// Build an in-memory configuration pointing at a backend. Never touches disk.
    pub fn for_backend(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.backend.url = url.into();
        config.backend.anon_key = anon_key.into();
        config
    }

    /// Get config directory path (~/.mk-training/)
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".mk-training"))
    }

    /// Get config file path (~/.mk-training/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;
        let mut config = Self::load_from(&config_file)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file. A missing file yields defaults
    /// that will be saved to that path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            tracing::debug!("Config file {:?} not found, using defaults", path);
            Self::default()
        };

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Overlay backend settings from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(URL_ENV).ok(),
            std::env::var(ANON_KEY_ENV).ok(),
        );
    }

    /// Overlay backend settings; empty values are ignored
    pub fn apply_overrides(&mut self, url: Option<String>, anon_key: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend.url = url;
        }
        if let Some(key) = anon_key.filter(|k| !k.trim().is_empty()) {
            self.backend.anon_key = key;
        }
    }

    /// Where `save` writes, if this configuration came from a file
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Save configuration to the file it was loaded from (or the default file)
    pub fn save(&self) -> Result<()> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::config_file()?,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents).context("Failed to write config file")?;

        tracing::debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Check if a session is stored
    pub fn is_authenticated(&self) -> bool {
        !self.auth.access_token.is_empty()
    }

    /// Store a freshly issued session
    pub fn set_session(&mut self, auth: AuthConfig) {
        self.auth = auth;
    }

    /// Forget the stored session
    pub fn clear_session(&mut self) {
        self.auth = AuthConfig::default();
    }

    /// Flip the dark-mode preference, returning the new value
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.ui.dark_mode = !self.ui.dark_mode;
        self.ui.dark_mode
    }
}
