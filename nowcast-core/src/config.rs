use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    auth::{KakaoAuthConfig, NavigationPolicy, kakao::DEFAULT_REDIRECT_URI},
    interpret::Language,
};

pub const KAKAO_REST_API_KEY_ENV: &str = "KAKAO_REST_API_KEY";
pub const KMA_SERVICE_KEY_ENV: &str = "KMA_SERVICE_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// kakao_rest_api_key = "..."
/// kma_service_key = "..."
/// language = "korean"
/// navigation = "optimistic"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Kakao application REST API key. Used as the OAuth client id and for
    /// the Local API.
    pub kakao_rest_api_key: Option<String>,

    /// data.go.kr service key for the KMA forecast services, raw or
    /// percent-encoded.
    pub kma_service_key: Option<String>,

    /// OAuth redirect URI; defaults to the app scheme.
    pub redirect_uri: Option<String>,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub navigation: NavigationPolicy,
}

impl Config {
    /// Load the config file and apply environment overrides.
    pub fn load() -> Result<Self> {
        Ok(Self::load_file()?.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Credentials from the environment take precedence over the file.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(KAKAO_REST_API_KEY_ENV) {
            self.kakao_rest_api_key = Some(key);
        }
        if let Some(key) = non_empty(KMA_SERVICE_KEY_ENV) {
            self.kma_service_key = Some(key);
        }
        self
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
        let dirs = ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn kakao_rest_api_key(&self) -> Option<&str> {
        non_blank(self.kakao_rest_api_key.as_deref())
    }

    pub fn kma_service_key(&self) -> Option<&str> {
        non_blank(self.kma_service_key.as_deref())
    }

    pub fn redirect_uri(&self) -> &str {
        non_blank(self.redirect_uri.as_deref()).unwrap_or(DEFAULT_REDIRECT_URI)
    }

    /// OAuth settings for the Kakao login.
    pub fn kakao_auth(&self) -> Result<KakaoAuthConfig> {
        let client_id = self.kakao_rest_api_key().ok_or_else(|| {
            anyhow!(
                "No Kakao REST API key configured.\n\
                 Hint: run `nowcast configure` or set {KAKAO_REST_API_KEY_ENV}."
            )
        })?;

        Ok(KakaoAuthConfig::new(client_id, self.redirect_uri()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
