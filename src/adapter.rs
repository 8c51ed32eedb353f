//! Request-integration adapter (the API sentinel): stamps protected
//! outbound requests with the signature header bundle, or cancels them when
//! signing fails. Unprotected requests pass through untouched.

use crate::error::WardenError;
use crate::risk::RiskMatrix;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// One outbound request as the host HTTP client hands it over: the client
/// owns transport; the sentinel only reads routing data and writes headers.
#[derive(Debug, Clone, Default)]
pub struct OutboundRequest {
    pub method: String,
    /// Absolute URL, or a path resolved against the client's base URL
    pub url: String,
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
    /// Only flagged requests are signed
    pub protect: bool,
}

impl OutboundRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn protected(mut self) -> Self {
        self.protect = true;
        self
    }
}

pub struct ApiSentinel {
    engine: Arc<RiskMatrix>,
    base_url: String,
    attached: AtomicBool,
}

impl ApiSentinel {
    pub fn new(engine: Arc<RiskMatrix>, base_url: impl Into<String>) -> Self {
        Self {
            engine,
            base_url: base_url.into(),
            attached: AtomicBool::new(false),
        }
    }

    /// Idempotent: the first call claims the client, repeats are a warning
    /// and a no-op.
    pub fn attach(&self) -> bool {
        if self.attached.swap(true, Ordering::AcqRel) {
            warn!("request interceptor already attached; ignoring");
            false
        } else {
            true
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Sign and stamp one outbound request in place. A signing failure
    /// surfaces as a cancellation and leaves the request unstamped; later
    /// requests are unaffected.
    pub fn process(&self, request: &mut OutboundRequest) -> Result<(), WardenError> {
        if !request.protect {
            return Ok(());
        }
        if !self.is_attached() {
            return Err(WardenError::NotInitialized);
        }

        let path = derive_path(&self.base_url, &request.url)
            .map_err(WardenError::into_cancellation)?;
        let params = if request.method.eq_ignore_ascii_case("GET") {
            &request.query
        } else {
            &request.body
        };

        let package = self
            .engine
            .sign_request(&request.method, &path, params)
            .map_err(|e| {
                warn!(url = %request.url, error = %e, "signing failed; cancelling request");
                e.into_cancellation()
            })?;

        for (name, value) in package.header_bundle() {
            request.headers.insert(name.to_string(), value);
        }
        Ok(())
    }
}

/// Join base and request URL, then keep only the path: no scheme, host,
/// query, or fragment ever enters the signing record.
pub fn derive_path(base_url: &str, target: &str) -> Result<String, WardenError> {
    let absolute = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    };
    let url = Url::parse(&absolute)
        .map_err(|e| WardenError::SigningFailed(format!("cannot resolve request url: {e}")))?;
    Ok(url.path().to_string())
}
