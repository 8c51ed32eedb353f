//! Session vault: acquires the server-issued `(key, token)` pair and rotates
//! it silently once the key enters its refresh window. The key doubles as
//! HMAC and AES material, so it never leaves process memory.

use crate::config::WardenConfig;
use crate::error::WardenError;
use chrono::Utc;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

pub const SESSION_ENDPOINT: &str = "/warden/init";

/// Server envelope for the init endpoint. A missing or mistyped field fails
/// the whole fetch.
#[derive(Debug, Deserialize)]
struct InitEnvelope {
    code: i64,
    #[serde(default)]
    data: Option<InitData>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InitData {
    key: String,
    token: String,
}

#[derive(Debug, Default)]
struct SessionState {
    key: Option<String>,
    token: Option<String>,
    acquired_at_ms: i64,
    expires_at_ms: i64,
}

/// Holds the current session under a lock; the in-flight flag makes the
/// silent refresh single-flight and is released on every exit path.
pub struct SessionVault {
    client: reqwest::blocking::Client,
    init_url: String,
    lifespan_ms: i64,
    refresh_buffer_ms: i64,
    state: Mutex<SessionState>,
    refreshing: AtomicBool,
}

impl SessionVault {
    pub fn new(config: &WardenConfig) -> Result<Self, WardenError> {
        let base = config.api_base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(WardenError::ConfigMissing);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.session.request_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| WardenError::SessionFetchFailed(e.to_string()))?;
        Ok(Self {
            client,
            init_url: format!("{}{}", base, SESSION_ENDPOINT),
            lifespan_ms: config.session.lifespan_ms as i64,
            refresh_buffer_ms: config.session.refresh_buffer_ms as i64,
            state: Mutex::new(SessionState::default()),
            refreshing: AtomicBool::new(false),
        })
    }

    /// First acquisition. Unlike the silent refresh, a failure here clears
    /// the vault and propagates: protected requests cannot proceed without
    /// a first key.
    pub fn initialize(&self) -> Result<(), WardenError> {
        match self.fetch_session() {
            Ok((key, token)) => {
                self.install(key, token);
                info!("session acquired");
                Ok(())
            }
            Err(e) => {
                if let Ok(mut state) = self.state.lock() {
                    *state = SessionState::default();
                }
                Err(e)
            }
        }
    }

    /// Current key, after a refresh check. Inside the refresh window exactly
    /// one caller wins the in-flight flag and fetches; everyone else gets
    /// the old key immediately. A failed refresh is logged and retried by
    /// whichever caller next enters the window.
    pub fn current_key(&self) -> Result<String, WardenError> {
        let (key, refresh_due) = {
            let state = self
                .state
                .lock()
                .map_err(|_| WardenError::SessionKeyUnavailable)?;
            match &state.key {
                None => return Err(WardenError::SessionKeyUnavailable),
                Some(key) => {
                    let now = Utc::now().timestamp_millis();
                    (key.clone(), now >= state.expires_at_ms - self.refresh_buffer_ms)
                }
            }
        };

        if refresh_due
            && self
                .refreshing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            match self.fetch_session() {
                Ok((new_key, new_token)) => {
                    self.install(new_key.clone(), new_token);
                    self.refreshing.store(false, Ordering::Release);
                    info!("session rotated");
                    return Ok(new_key);
                }
                Err(e) => {
                    self.refreshing.store(false, Ordering::Release);
                    warn!(error = %e, "silent session refresh failed; keeping current key");
                }
            }
        }

        Ok(key)
    }

    /// Cached token, no I/O and no refresh check.
    pub fn current_token(&self) -> Option<String> {
        self.state.lock().ok().and_then(|s| s.token.clone())
    }

    pub fn has_session(&self) -> bool {
        self.state.lock().map(|s| s.key.is_some()).unwrap_or(false)
    }

    pub fn expires_at_ms(&self) -> Option<i64> {
        self.state
            .lock()
            .ok()
            .filter(|s| s.key.is_some())
            .map(|s| s.expires_at_ms)
    }

    fn install(&self, key: String, token: String) {
        let now = Utc::now().timestamp_millis();
        if let Ok(mut state) = self.state.lock() {
            state.key = Some(key);
            state.token = Some(token);
            state.acquired_at_ms = now;
            state.expires_at_ms = now + self.lifespan_ms;
        }
    }

    fn fetch_session(&self) -> Result<(String, String), WardenError> {
        let response = self
            .client
            .post(&self.init_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .map_err(|e| WardenError::SessionFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WardenError::SessionFetchFailed(format!(
                "init endpoint returned {}",
                status
            )));
        }

        let envelope: InitEnvelope = response
            .json()
            .map_err(|e| WardenError::SessionFetchFailed(format!("malformed init envelope: {e}")))?;

        if envelope.code != 0 {
            return Err(WardenError::SessionFetchFailed(format!(
                "init code {}: {}",
                envelope.code,
                envelope.msg.unwrap_or_default()
            )));
        }
        let data = envelope.data.ok_or_else(|| {
            WardenError::SessionFetchFailed("init envelope missing data".to_string())
        })?;
        Ok((data.key, data.token))
    }
}
