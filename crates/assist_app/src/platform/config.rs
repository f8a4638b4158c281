//! Application configuration, stored as RON next to the working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use assist_engine::{AssistConfig, ConfigError};
use assist_logging::LogDestination;
use serde::Deserialize;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "assist.ron";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigLoadError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub log_destination: LogDestination,
    /// Only used when `log_destination` writes to a file.
    pub log_file: Option<PathBuf>,
    pub assist: AssistConfig,
}

/// Reads and validates `path`. `Ok(None)` when the file does not exist.
pub(crate) fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigLoadError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.assist.validate()?;
    Ok(Some(config))
}
