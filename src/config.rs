use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::filter::DEFAULT_MARKER;

pub const DEFAULT_CONFIG_FILE: &str = "bold2qiime.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    /// Kingdom written for every record instead of inferring it.
    #[serde(default)]
    pub kingdom: Option<String>,
    #[serde(default)]
    pub marker_code: Option<String>,
    /// Literal cell values treated as missing on top of the built-in set.
    #[serde(default)]
    pub missing_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub kingdom: Option<String>,
    pub marker_code: String,
    pub missing_tokens: Vec<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            kingdom: None,
            marker_code: DEFAULT_MARKER.to_string(),
            missing_tokens: Vec::new(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `bold2qiime.json` in the current directory when no
    /// path is given. Only an explicitly named file is required to exist.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ConvertError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ConvertError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ConvertError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ConvertError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(ConvertError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }

        let marker_code = match config.marker_code {
            Some(marker) if marker.trim().is_empty() => {
                return Err(ConvertError::ConfigParse(
                    "marker_code must not be empty".to_string(),
                ));
            }
            Some(marker) => marker,
            None => DEFAULT_MARKER.to_string(),
        };

        Ok(ResolvedConfig {
            schema_version,
            kingdom: config.kingdom,
            marker_code,
            missing_tokens: config.missing_tokens,
        })
    }
}
