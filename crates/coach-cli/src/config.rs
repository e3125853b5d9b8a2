//! Configuration file management for coach.
//!
//! Provides a TOML-based config file at `~/.config/coach/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use coach_core::generate::ModelConfig;

/// Default listen address for `coach serve`.
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Default listen port for `coach serve`.
pub const DEFAULT_PORT: u16 = 8000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub model: ModelSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelSection {
    /// Model identifier sent to the completions endpoint.
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts before falling back to the deterministic scheduler.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            attempts: default_attempts(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_model_name() -> String {
    ModelConfig::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    ModelConfig::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    ModelConfig::DEFAULT_TIMEOUT_SECS
}

fn default_attempts() -> u32 {
    ModelConfig::DEFAULT_ATTEMPTS
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the coach config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/coach` or `~/.config/coach`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("coach");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("coach")
}

/// Return the path to the default coach config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write a config file, creating parent dirs as needed.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct CoachConfig {
    pub bind: String,
    pub port: u16,
    /// `None` when no API key is available; plans then come from the
    /// deterministic scheduler only.
    pub model: Option<ModelConfig>,
}

impl CoachConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Bind: `cli_bind` > `COACH_BIND` > `server.bind` > `0.0.0.0`
    /// - Port: `cli_port` > `COACH_PORT` > `server.port` > `8000`
    /// - Model: `COACH_MODEL` > `model.name` > default model
    /// - Base URL: `OPENROUTER_BASE_URL` > `model.base_url` > OpenRouter
    /// - API key: `OPENROUTER_API_KEY` only
    ///
    /// An explicit `config_file` must exist; the default location may be absent.
    pub fn resolve(
        config_file: Option<&Path>,
        cli_bind: Option<&str>,
        cli_port: Option<u16>,
    ) -> Result<Self> {
        let file_config = match config_file {
            Some(path) => load_config(path)?,
            None => {
                let path = config_path();
                if path.exists() {
                    load_config(&path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let bind = if let Some(bind) = cli_bind {
            bind.to_string()
        } else if let Some(bind) = env_value("COACH_BIND") {
            bind
        } else {
            file_config.server.bind
        };

        let port = if let Some(port) = cli_port {
            port
        } else if let Some(port) = env_value("COACH_PORT") {
            port.parse()
                .with_context(|| format!("COACH_PORT is not a valid port: {port:?}"))?
        } else {
            file_config.server.port
        };

        let model = env_value("OPENROUTER_API_KEY").map(|api_key| ModelConfig {
            api_key,
            base_url: env_value("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| file_config.model.base_url.clone()),
            model: env_value("COACH_MODEL").unwrap_or_else(|| file_config.model.name.clone()),
            timeout: Duration::from_secs(file_config.model.timeout_secs),
            attempts: file_config.model.attempts,
        });

        Ok(Self { bind, port, model })
    }
}

/// Non-empty environment variable value.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
