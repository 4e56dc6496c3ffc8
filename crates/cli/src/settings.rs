//! `config.yaml` loading.

use std::fs;
use std::path::Path;

use docport_core::ConvertError;
use docport_hugo::ConverterConfig;
use serde::{Deserialize, Serialize};

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Everything a configuration file can hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Conversion tables and switches, at the top level of the file.
    #[serde(flatten)]
    pub converter: ConverterConfig,
    /// Site identity written to `hugo.yaml` and shown by `docport info`.
    pub hugo: SiteInfo,
}

/// Basic Hugo site identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    /// Site title.
    pub title: String,
    /// Root URL of the published site.
    pub base_url: String,
    /// Content language.
    pub language_code: String,
    /// Site description, written to `hugo.yaml` and the root index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hugo module imported as the theme.
    pub theme_module: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            base_url: "/".to_string(),
            language_code: "en-us".to_string(),
            description: None,
            theme_module: "github.com/google/docsy".to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConvertError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|err| ConvertError::Config(err.to_string()))
    }

    /// Reads settings from `path`.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let text = fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
        Self::from_yaml(&text).map_err(|err| match err {
            ConvertError::Config(reason) => {
                ConvertError::Config(format!("{}: {reason}", path.display()))
            }
            other => other,
        })
    }

    /// Reads `path` when given, else `config.yaml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConvertError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    log::debug!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}
