//! Configuration: TOML file for endpoints, environment for credentials

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for animeline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub mal: MalConfig,
    pub bigquery: BigQueryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MalConfig {
    pub ranking_url: String,
    pub token_url: String,
}

impl Default for MalConfig {
    fn default() -> Self {
        Self {
            ranking_url: animeline_mal::api::RANKING_URL.to_string(),
            token_url: animeline_mal::auth::TOKEN_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BigQueryConfig {
    pub base_url: String,
    pub table: String,
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            base_url: animeline_bigquery::loader::BASE_URL.to_string(),
            table: "mal_anime_ranking".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./animeline.toml (current directory)
    /// 2. ~/.config/animeline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("animeline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "animeline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Credentials and destination identifiers from the environment.
///
/// Missing values degrade to empty strings with a warning so a misconfigured
/// agent still starts; the failure surfaces on the first real external call.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub client_id: String,
    pub project_id: String,
    pub dataset_id: String,
    pub warehouse_token: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            access_token: env_or_warn("ACCESS_TOKEN"),
            refresh_token: env_or_warn("REFRESH_TOKEN"),
            client_id: env_or_warn("CLIENT_ID"),
            project_id: env_or_warn("PROJECT_ID"),
            dataset_id: env_or_warn("DATASET_ID"),
            warehouse_token: env_or_warn("GOOGLE_ACCESS_TOKEN"),
        }
    }

    /// The MAL credential handed to the token manager for this run.
    pub fn mal_credential(&self) -> animeline_mal::Credential {
        animeline_mal::Credential {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

fn env_or_warn(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        log::warn!("environment variable {key} is not set");
        String::new()
    })
}
