//! Client configuration: API key, endpoint and theme.
//!
//! The key is resolved from, in order: the `--api-key` flag, the
//! `HEIGHT_API_KEY` environment variable, and `~/.config/height/config.json`.
//! The theme is an explicit configuration value consumed by the color
//! helpers, never ambient state.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use url::Url;

/// Public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.height.app";

/// Terminal theme, used to pick the fallback tint when an entity has no hue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: Url,
    pub theme: Theme,
}

/// On-disk configuration file shape. Every field is optional; flags and the
/// environment take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl Config {
    /// Resolve configuration from flags, environment and the config file.
    pub fn resolve(api_key_flag: Option<String>, theme_flag: Option<Theme>) -> Result<Self> {
        let file = load_config_file()?;
        let env_key = std::env::var("HEIGHT_API_KEY").ok().filter(|k| !k.is_empty());
        Config::from_parts(api_key_flag, env_key, file, theme_flag)
    }

    /// Pure merge of the configuration sources.
    fn from_parts(
        flag_key: Option<String>,
        env_key: Option<String>,
        file: ConfigFile,
        theme_flag: Option<Theme>,
    ) -> Result<Self> {
        let Some(api_key) = flag_key.or(env_key).or(file.api_key) else {
            bail!(
                "no API key found; pass --api-key, set HEIGHT_API_KEY, \
                 or add \"apiKey\" to {}",
                config_file_path().display()
            );
        };
        let base_url = match file.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
        };
        let theme = theme_flag.or(file.theme).unwrap_or_default();
        Ok(Config {
            api_key,
            base_url,
            theme,
        })
    }
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join("height").join("config.json")
}

fn load_config_file() -> Result<ConfigFile> {
    let path = config_file_path();
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
