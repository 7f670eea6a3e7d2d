use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::document::DocumentConfig;

pub const CONFIG_ENV_VAR: &str = "FRONTIER_DOCUMENT_CONFIG";
const DEFAULT_MAX_PENDING_JOBS: usize = 1000;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read document config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on queued jobs drained after each evaluation; 0 drains none.
    pub max_pending_jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_pending_jobs: DEFAULT_MAX_PENDING_JOBS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub document: DocumentConfig,
    pub engine: EngineConfig,
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            engine: EngineConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Loads the YAML file at `config_path`, falling back to defaults when no
    /// path is given or the file does not exist.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let Some(path) = config_path.filter(|path| path.exists()) else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
    }
}
