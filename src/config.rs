//! Warden configuration. `api_base_url` is the only required field; session
//! rotation windows and logging carry production defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Base URL of the protected API; the session endpoint lives under it
    pub api_base_url: String,
    /// Session lifetime and rotation window
    pub session: SessionConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session key lifetime (milliseconds)
    pub lifespan_ms: u64,
    /// Rotation starts this long before expiry (milliseconds)
    pub refresh_buffer_ms: u64,
    /// HTTP timeout for the session endpoint (seconds)
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            session: SessionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifespan_ms: 30 * 60 * 1000,
            refresh_buffer_ms: 2 * 60 * 1000,
            request_timeout_secs: 15,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl WardenConfig {
    /// Build a config for the given API base URL with default windows.
    pub fn for_api(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Load from JSON file if present; otherwise return default.
    /// `api_base_url` validation happens at `Warden::initialize`.
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<WardenConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
