//! Canvas fingerprint: fixed draw plan rendered to a data URL.

use super::{ProbeResult, ProbeSample, ProbeSentinel};
use crate::host::{HostEnvironment, CANVAS_SCRIPT};
use tracing::debug;

pub(crate) fn collect(host: &dyn HostEnvironment) -> ProbeResult {
    match host.render_canvas(&CANVAS_SCRIPT) {
        Ok(data_url) => Ok(ProbeSample::Canvas(data_url)),
        Err(e) => {
            debug!(error = %e, "canvas render failed");
            Err(ProbeSentinel::Canvas)
        }
    }
}
