use std::path::PathBuf;
use symptom_flow::EngineConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Service settings, read from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_format: LogFormat,
    /// YAML file replacing the built-in vocabulary and catalog
    pub reference_path: Option<PathBuf>,
    pub engine: EngineConfig,
    /// Fixed RNG seed; random per process when unset
    pub seed: Option<u64>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => 3000,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let engine = match lookup("ENGINE_PRESET") {
            Some(value) => EngineConfig::preset(&value).ok_or(ConfigError::Invalid {
                key: "ENGINE_PRESET",
                value,
            })?,
            None => EngineConfig::guided(),
        };

        let seed = match lookup("ENGINE_SEED") {
            Some(value) => Some(
                value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid { key: "ENGINE_SEED", value })?,
            ),
            None => None,
        };

        Ok(Self {
            port,
            log_format,
            reference_path: lookup("REFERENCE_DATA").map(PathBuf::from),
            engine,
            seed,
        })
    }
}
