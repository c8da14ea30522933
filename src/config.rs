// Shell configuration, fixed at build time.
// shell.json is compiled into the binary; there is no runtime override.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::modules::controller::ControllerConfig;

const BUNDLED: &str = include_str!("../shell.json");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid shell config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid target url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported target scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
    #[error("load timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellConfig {
    pub target_url: String,
    pub load_timeout_ms: u64,
    pub overlay_hide_delay_ms: u64,
    pub window_title: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            target_url: "https://pathoglden.top/get/".to_string(),
            load_timeout_ms: 10_000,
            overlay_hide_delay_ms: 100,
            window_title: "Path to the Golden Egg".to_string(),
        }
    }
}

impl ShellConfig {
    /// The configuration shipped inside the binary.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target()?;
        if self.load_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn target(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.target_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: self.target_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        self.validate()?;
        Ok(ControllerConfig {
            target: self.target()?,
            load_timeout: Duration::from_millis(self.load_timeout_ms),
            overlay_hide_delay: Duration::from_millis(self.overlay_hide_delay_ms),
        })
    }
}
