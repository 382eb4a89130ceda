use crate::analysis::AnalysisLimits;
use crate::github::RemoteLimits;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const MIN_API_KEY_LEN: usize = 20;

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub github: GithubConfig,
    pub analysis: AnalysisLimits,
    pub remote: RemoteLimits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    #[serde(skip)]
    pub api_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GithubConfig {
    pub token: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Missing or unreadable config is not an error; the defaults apply.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), "Ignoring unreadable config: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }

    /// `GEMINI_API_KEY` and `GITHUB_TOKEN` take precedence over stored values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.gemini.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.trim().is_empty() {
                self.github.token = Some(token.trim().to_string());
            }
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.gemini.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.gemini.api_key = Some(key.trim().to_string());
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "gitguide", "gitguide")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn validate_api_key(input: &str) -> std::result::Result<(), &'static str> {
    let input = input.trim();
    if input.is_empty() {
        return Err("API key is required");
    }
    if input.len() < MIN_API_KEY_LEN {
        return Err("API key seems too short. Please check and try again.");
    }
    Ok(())
}

/// Shows only the last 8 characters.
pub fn mask_api_key(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(8)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}{}", "*".repeat(20), tail)
}
