use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::DEFAULT_MODEL;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("content-crawler");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("crawler.db").to_string_lossy().to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_concurrent_sources() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            anthropic_api_key: None,
            youtube_api_key: None,
            model: default_model(),
            max_concurrent_sources: default_max_concurrent_sources(),
        }
    }
}

impl Config {
    /// Reads the config file (writing defaults on first run), then applies
    /// environment overrides. A `.env` in the working directory is honored.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("content-crawler")
            .join("config.toml")
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("CRAWLER_DB_PATH") {
            self.db_path = path;
        }
        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Some(key) = get("YOUTUBE_API_KEY") {
            self.youtube_api_key = Some(key);
        }
        if let Some(model) = get("CRAWLER_MODEL") {
            self.model = model;
        }
    }

    pub fn anthropic_api_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("ANTHROPIC_API_KEY is not set".to_string()))
    }
}
