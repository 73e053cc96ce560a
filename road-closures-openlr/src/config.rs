use crate::model::Format;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_PREFIX: &str = "OPENLR";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failure reading {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("failure decoding {0}: {1}")]
    DecodeError(String, String),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("failure applying {ENV_PREFIX}_* environment overrides: {source}")]
    EnvironmentError {
        #[from]
        source: config::ConfigError,
    },
    #[error("invalid OpenLR configuration: {0}")]
    InvalidValue(String),
}

/// settings for location referencing, supplied by the environment that hosts
/// the codec. the codec never mutates them.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct OpenLrConfig {
    pub enabled: bool,
    pub format: Format,
    pub map_version: String,
    /// maximum mean drift, in meters, for a decoded reference to be valid
    pub accuracy_tolerance: f64,
    /// consecutive points closer than this, in meters, produce a warning
    pub min_distance: f64,
    /// decimal places kept when coordinates are reported
    pub coordinate_precision: u32,
    /// network timeout in seconds for way geometry lookups
    pub timeout: u64,
    pub overpass_url: String,
    pub regeneration_chunk_size: usize,
}

impl Default for OpenLrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: Format::Base64,
            map_version: String::from("latest"),
            accuracy_tolerance: 50.0,
            min_distance: 15.0,
            coordinate_precision: 5,
            timeout: 10,
            overpass_url: String::from(DEFAULT_OVERPASS_URL),
            regeneration_chunk_size: 100,
        }
    }
}

impl OpenLrConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// layers `OPENLR_*` environment variables (e.g. `OPENLR_ACCURACY_TOLERANCE=25.0`)
    /// on top of this configuration.
    pub fn with_env_overrides(self) -> Result<OpenLrConfig, ConfigError> {
        let conf: OpenLrConfig = config::Config::builder()
            .add_source(config::Config::try_from(&self)?)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.accuracy_tolerance >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "accuracy_tolerance must be non-negative, found {}",
                self.accuracy_tolerance
            )));
        }
        if !(self.min_distance >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "min_distance must be non-negative, found {}",
                self.min_distance
            )));
        }
        if self.coordinate_precision > 15 {
            return Err(ConfigError::InvalidValue(format!(
                "coordinate_precision must be at most 15, found {}",
                self.coordinate_precision
            )));
        }
        if self.regeneration_chunk_size == 0 {
            return Err(ConfigError::InvalidValue(String::from(
                "regeneration_chunk_size must be positive",
            )));
        }
        Ok(())
    }
}

impl TryFrom<&String> for OpenLrConfig {
    type Error = ConfigError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let conf: OpenLrConfig = if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| ConfigError::ReadError(f.clone(), e))?;
            toml::from_str(&s).map_err(|e| ConfigError::DecodeError(f.clone(), e.to_string()))?
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| ConfigError::ReadError(f.clone(), e))?;
            serde_json::from_str(&s).map_err(|e| ConfigError::DecodeError(f.clone(), e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFileType(f.clone()));
        };
        conf.validate()?;
        Ok(conf)
    }
}
