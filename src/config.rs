/// Extension settings, read from chrome.storage.local at popup startup

use crate::error::{HoldError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Storage key holding an optional `Config` override
pub const CONFIG_STORAGE_KEY: &str = "holdmypage_config";

pub const DEFAULT_BASE_URL: &str = "http://holdmypage.appspot.com";
pub const DEFAULT_BADGE_TEXT: &str = "HELD";
pub const DEFAULT_BADGE_DURATION_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address of the bookmarking service
    pub base_url: String,
    /// Badge label shown after a successful submission
    pub badge_text: String,
    pub badge_duration_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            badge_text: DEFAULT_BADGE_TEXT.to_string(),
            badge_duration_ms: DEFAULT_BADGE_DURATION_MS,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| HoldError::Config(format!("invalid base_url {:?}: {}", self.base_url, e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(HoldError::Config(format!(
                "base_url must be http or https, got {:?}",
                base.scheme()
            )));
        }

        Ok(())
    }

    /// Full URL of a service endpoint, e.g. `endpoint("add")`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        Url::parse(&joined).map_err(|e| HoldError::Config(format!("invalid endpoint {:?}: {}", joined, e)))
    }
}
