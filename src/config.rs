//! Configuration for lexsim.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (LEXSIM_MODEL, LEXSIM_API_BASE, GEMINI_API_KEY)
//! 2. Config file (.lexsim/config.yaml in the current directory or a parent,
//!    then the user config directory)
//! 3. Defaults (gemini-2.5-flash, no request timeout)
//!
//! The API key is only ever read from the environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::gemini::{DEFAULT_MODEL, GEMINI_API_BASE};
use crate::adapters::prompts::DEFAULT_LANGUAGE;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Env var holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback env var for the API key
pub const API_KEY_FALLBACK_ENV: &str = "API_KEY";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub model: Option<ModelConfig>,
    #[serde(default)]
    pub prompts: Option<PromptsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Model identifier
    pub name: Option<String>,
    /// API root URL
    pub api_base: Option<String>,
    /// Per-request timeout; unset means wait indefinitely
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptsConfig {
    /// Language the model is asked to answer in
    pub language: Option<String>,
}

/// Resolved configuration
#[derive(Clone)]
pub struct ResolvedConfig {
    /// Model identifier
    pub model: String,
    /// API root URL
    pub api_base: String,
    /// API credential, if any
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Output language for prompts
    pub language: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Key shown in diagnostics
    pub fn redacted_key(&self) -> &'static str {
        if self.api_key.is_some() {
            "<set>"
        } else {
            "<missing>"
        }
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.redacted_key())
            .field("timeout", &self.timeout)
            .field("language", &self.language)
            .field("config_file", &self.config_file)
            .finish()
    }
}

/// Find config file by searching current directory and parents, then the user config dir
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".lexsim").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("lexsim").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file settings with environment lookups and defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let (config_file, model_config, prompts_config) = match file {
        Some((path, config)) => (
            Some(path),
            config.model.unwrap_or_default(),
            config.prompts.unwrap_or_default(),
        ),
        None => (None, ModelConfig::default(), PromptsConfig::default()),
    };

    let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    let model = non_empty("LEXSIM_MODEL")
        .or(model_config.name)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let api_base = non_empty("LEXSIM_API_BASE")
        .or(model_config.api_base)
        .unwrap_or_else(|| GEMINI_API_BASE.to_string());

    let api_key = non_empty(API_KEY_ENV).or_else(|| non_empty(API_KEY_FALLBACK_ENV));

    let language = prompts_config
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    ResolvedConfig {
        model,
        api_base,
        api_key,
        timeout: model_config.timeout_seconds.map(Duration::from_secs),
        language,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    Ok(resolve(file, |name| std::env::var(name).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
