//! Error taxonomy for the warden surface.
//!
//! Probe failures are deliberately absent: they never escape the probe
//! fabric and are folded into the risk score as sentinels instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    /// `process_request` reached an interceptor that was never attached.
    #[error("warden is not initialized")]
    NotInitialized,

    /// Configuration lacks the required `api_base_url`.
    #[error("configuration is missing `api_base_url`")]
    ConfigMissing,

    /// Network or envelope error talking to the session endpoint.
    /// Fatal on first initialization; swallowed on silent refresh.
    #[error("session fetch failed: {0}")]
    SessionFetchFailed(String),

    /// The engine was asked to sign without a session key.
    #[error("no session key available for signing")]
    SessionKeyUnavailable,

    /// Unexpected failure during gather/score/encrypt/sign.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The adapter cancelled an outbound request after a signing failure.
    #[error("request cancelled: {0}")]
    RequestCancelled(#[source] Box<WardenError>),
}

impl WardenError {
    /// Wrap a pipeline failure as the cancellation the caller observes.
    pub fn into_cancellation(self) -> WardenError {
        WardenError::RequestCancelled(Box::new(self))
    }
}
