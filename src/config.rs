use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::ranking::DEFAULT_TOP_K;

/// Data directory baked in at build time, like a web bundle's base URL.
pub const DEFAULT_BASE_PATH: &str = match option_env!("DASHBOARD_BASE_PATH") {
    Some(path) => path,
    None => "public",
};

/// Optional per-directory overrides, looked up inside the base path.
pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where the two sources live and how they are ranked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory the resources are resolved against. Never read from the
    /// config file itself.
    #[serde(skip)]
    pub base_path: PathBuf,
    /// Long `date, <state>…` table feeding the chart and the state ranking.
    pub aggregated_file: String,
    /// Wide `RegionName, StateName, <date>…` table feeding the region ranking.
    pub regional_file: String,
    /// Nationwide series: listed first, never ranked.
    pub aggregate_series: String,
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            aggregated_file: "aggregated_states.csv".to_string(),
            regional_file: "Metro_invt_fs_uc_sfrcondo_sm_week.csv".to_string(),
            aggregate_series: "United States".to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AppConfig {
    /// Defaults for `base`, overridden by `base/dashboard.json` when present.
    pub fn resolve(base: &Path) -> Result<Self, ConfigError> {
        let path = base.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let parsed: AppConfig = serde_json::from_str(&text)
                .map_err(|source| ConfigError::Json { path: path.clone(), source })?;
            log::info!("Using overrides from {}", path.display());
            parsed
        } else {
            AppConfig::default()
        };
        config.base_path = base.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".into()));
        }
        if self.aggregated_file.trim().is_empty() || self.regional_file.trim().is_empty() {
            return Err(ConfigError::Invalid("resource names must not be empty".into()));
        }
        Ok(())
    }
}
