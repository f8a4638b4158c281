use std::time::Duration;

use assist_core::{SelectorList, SummaryLength, Tone};
use serde::Deserialize;
use url::Url;

use crate::resolve::{CompiledSelectors, SelectorError};

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8080/api/email";
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 1200;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid backend base url `{url}`: {message}")]
    InvalidBackendUrl { url: String, message: String },
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Selector fallback chains for each host element. Host page variants are
/// handled here, as data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    pub toolbar: SelectorList,
    pub compose_box: SelectorList,
    pub email_content: SelectorList,
    pub compose_detect: SelectorList,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            toolbar: SelectorList::toolbar(),
            compose_box: SelectorList::compose_box(),
            email_content: SelectorList::email_content(),
            compose_detect: SelectorList::compose_detect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub backend_base_url: String,
    pub tone: Tone,
    pub summary_length: SummaryLength,
    pub settle_delay_ms: u64,
    pub startup_delay_ms: u64,
    pub selectors: SelectorSet,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            tone: Tone::default(),
            summary_length: SummaryLength::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            selectors: SelectorSet::default(),
        }
    }
}

impl AssistConfig {
    /// Checks the base URL and that every selector parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.backend_base_url).map_err(|err| {
            ConfigError::InvalidBackendUrl {
                url: self.backend_base_url.clone(),
                message: err.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBackendUrl {
                url: self.backend_base_url.clone(),
                message: format!("unsupported scheme {}", url.scheme()),
            });
        }
        for list in [
            &self.selectors.toolbar,
            &self.selectors.compose_box,
            &self.selectors.email_content,
            &self.selectors.compose_detect,
        ] {
            CompiledSelectors::compile(list)?;
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}
