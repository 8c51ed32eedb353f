//! WebGL adapter fingerprint. Prefers the unmasked vendor/renderer from the
//! debug extension, falls back to the masked pair.

use super::{ProbeResult, ProbeSample, ProbeSentinel, WebglFingerprint};
use crate::host::HostEnvironment;
use tracing::debug;

pub(crate) fn collect(host: &dyn HostEnvironment) -> ProbeResult {
    match host.webgl_context() {
        Ok(Some(info)) => Ok(ProbeSample::Webgl(WebglFingerprint {
            vendor: info.unmasked_vendor.unwrap_or(info.vendor),
            renderer: info.unmasked_renderer.unwrap_or(info.renderer),
        })),
        Ok(None) => Err(ProbeSentinel::NoWebgl),
        Err(e) => {
            debug!(error = %e, "webgl context failed");
            Err(ProbeSentinel::Webgl)
        }
    }
}
