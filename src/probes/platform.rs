//! Navigator- and screen-derived fingerprints: platform, screen, language,
//! plugins. Navigator failures map to `err_platform`; the screen probe owns
//! `err_screen`.

use super::{PlatformFingerprint, ProbeResult, ProbeSample, ProbeSentinel, ScreenFingerprint};
use crate::host::HostEnvironment;

pub(crate) fn platform(host: &dyn HostEnvironment, click_count: u64) -> ProbeResult {
    match host.navigator() {
        Ok(nav) => Ok(ProbeSample::Platform(PlatformFingerprint {
            platform: nav.platform,
            plugins: nav.plugins.join(","),
            touch_points: nav.max_touch_points,
            click_count,
        })),
        Err(_) => Err(ProbeSentinel::Platform),
    }
}

pub(crate) fn screen(host: &dyn HostEnvironment) -> ProbeResult {
    match (host.screen(), host.navigator()) {
        (Ok(scr), Ok(nav)) => Ok(ProbeSample::Screen(ScreenFingerprint {
            screen: format!("{}x{}x{}", scr.width, scr.height, scr.color_depth),
            language: nav.language,
        })),
        _ => Err(ProbeSentinel::Screen),
    }
}

pub(crate) fn language(host: &dyn HostEnvironment) -> ProbeResult {
    match host.navigator() {
        Ok(nav) => Ok(ProbeSample::Language(nav.language)),
        Err(_) => Err(ProbeSentinel::Platform),
    }
}

pub(crate) fn plugins(host: &dyn HostEnvironment) -> ProbeResult {
    match host.navigator() {
        Ok(nav) => Ok(ProbeSample::Plugins(nav.plugins.join(","))),
        Err(_) => Err(ProbeSentinel::Platform),
    }
}
