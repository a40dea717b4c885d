//! Site configuration loaded from `snippets.toml`
//!
//! Every table is optional. A missing file is the same as an empty one.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::snippet::HarvestConfig;

/// File name of the configuration inside a themes directory
pub const CONFIG_FILE: &str = "snippets.toml";

/// Errors that can occur when loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Which themes a request works with
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemesConfig {
    /// The site's current theme, where snippets are harvested from
    pub current: Option<String>,
    /// Theme of the request itself, used outside the theme scope
    pub request: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub themes: ThemesConfig,
    pub harvest: HarvestConfig,
    /// Token values available to displayed snippets
    pub tokens: BTreeMap<String, String>,
    /// Translations for the string catalog
    pub strings: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `snippets.toml` from a themes directory, if there is one
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_current_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.current = Some(theme.into());
        self
    }

    pub fn with_request_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.request = Some(theme.into());
        self
    }

    pub fn with_harvest(mut self, harvest: HarvestConfig) -> Self {
        self.harvest = harvest;
        self
    }

    pub fn with_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(name.into(), value.into());
        self
    }
}
