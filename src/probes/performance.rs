//! Page-load timing fingerprint. Modern navigation entry preferred; legacy
//! timing is reported with `transfer_size = -1`.

use super::{PerfFingerprint, ProbeResult, ProbeSample, ProbeSentinel};
use crate::host::{HostEnvironment, NavigationTiming, TimingFault};

pub(crate) fn collect(host: &dyn HostEnvironment) -> ProbeResult {
    match host.navigation_timing() {
        Ok(NavigationTiming::Modern {
            entry_type,
            transfer_size,
            duration_ms,
        }) => Ok(ProbeSample::Performance(PerfFingerprint {
            entry_type,
            transfer_size,
            load_time_ms: duration_ms,
        })),
        Ok(NavigationTiming::Legacy {
            navigation_start,
            load_event_end,
        }) => Ok(ProbeSample::Performance(PerfFingerprint {
            entry_type: "legacy".to_string(),
            transfer_size: -1,
            load_time_ms: load_event_end - navigation_start,
        })),
        Err(TimingFault::NoPerfApi) => Err(ProbeSentinel::NoPerfApi),
        Err(TimingFault::NoTiming) => Err(ProbeSentinel::NoTiming),
        Err(TimingFault::Failed) => Err(ProbeSentinel::Perf),
    }
}
