//! Audio fingerprint: offline render of the fixed oscillator/compressor
//! graph, summed over a stable sample window.

use super::{ProbeResult, ProbeSample, ProbeSentinel};
use crate::host::{AudioFault, HostEnvironment, AUDIO_GRAPH};

/// Channel-0 window [4500, 5000) summed for the fingerprint.
const WINDOW_START: usize = 4500;
const WINDOW_LEN: usize = 500;

pub(crate) fn collect(host: &dyn HostEnvironment) -> ProbeResult {
    match host.render_offline_audio(&AUDIO_GRAPH) {
        Ok(samples) => {
            let sum: f64 = samples
                .iter()
                .skip(WINDOW_START)
                .take(WINDOW_LEN)
                .map(|s| f64::from(s.abs()))
                .sum();
            Ok(ProbeSample::Audio(format!("{}", sum)))
        }
        Err(AudioFault::NoOfflineContext) => Err(ProbeSentinel::NoOfflineContext),
        Err(AudioFault::GraphSetup) => Err(ProbeSentinel::AudioContext),
        Err(AudioFault::Render) => Err(ProbeSentinel::AudioRender),
    }
}
