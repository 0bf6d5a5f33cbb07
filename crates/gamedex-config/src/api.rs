//! Listing API configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote listing endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listing endpoint, queried with `?page=<n>&limit=<n>`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records requested per remote page
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

fn default_base_url() -> String {
    "https://debuggers-games-api.duckdns.org/api/games".to_string()
}

fn default_fetch_limit() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("Gamedex/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch_limit: default_fetch_limit(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            use_system_proxy: true,
        }
    }
}
