//! Fetch configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// HTTP behavior settings for the built-in page fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    format!("site-profiler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FetchConfig {
    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(ProfileError::validation("fetch config", "user_agent"));
        }
        if self.timeout_secs == 0 {
            return Err(ProfileError::validation("fetch config", "timeout_secs"));
        }
        Ok(())
    }
}
