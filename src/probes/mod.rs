//! Probe fabric (the data loom): environment and behavior collectors with
//! uniform fault semantics, dispatched by tag.
//!
//! Every probe either returns a well-formed sample or one of the closed-set
//! sentinel errors; nothing panics or propagates out of the fabric. The risk
//! scorer pattern-matches the sentinels, so their spelling is contract.

mod audio;
mod canvas;
mod performance;
mod platform;
mod trajectory;
mod webgl;

use crate::anomaly::{AnomalyReport, AnomalyScanner};
use crate::host::HostEnvironment;
use crate::policy::Policy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub use trajectory::{
    analyze, TrajectoryAnalysis, TrajectoryRecorder, TrajectoryReport, MAX_SAMPLES,
    MIN_SAMPLE_GAP_MS,
};

/// Probe tags. The scheduler emits an ordered sequence of these; the loom
/// dispatches by exhaustive match. Unlisted probes are never invoked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Platform,
    Screen,
    Language,
    Plugins,
    Canvas,
    Webgl,
    Audio,
    Performance,
    MouseTrajectory,
    AnomalyScan,
}

impl ProbeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Screen => "screen",
            Self::Language => "language",
            Self::Plugins => "plugins",
            Self::Canvas => "canvas",
            Self::Webgl => "webgl",
            Self::Audio => "audio",
            Self::Performance => "performance",
            Self::MouseTrajectory => "mouse_trajectory",
            Self::AnomalyScan => "anomaly_scan",
        }
    }
}

/// Closed set of sentinel errors a probe may produce instead of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSentinel {
    Canvas,
    NoWebgl,
    Webgl,
    NoOfflineContext,
    AudioRender,
    AudioContext,
    Platform,
    Screen,
    NoPerfApi,
    NoTiming,
    Perf,
}

impl ProbeSentinel {
    /// The wire spelling the server and the risk scorer match against.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canvas => "err_canvas",
            Self::NoWebgl => "err_no_webgl",
            Self::Webgl => "err_webgl",
            Self::NoOfflineContext => "err_no_offline_context",
            Self::AudioRender => "err_audio_render",
            Self::AudioContext => "err_audio_context",
            Self::Platform => "err_platform",
            Self::Screen => "err_screen",
            Self::NoPerfApi => "err_no_perf_api",
            Self::NoTiming => "err_no_timing",
            Self::Perf => "err_perf",
        }
    }

    pub const ALL: [ProbeSentinel; 11] = [
        Self::Canvas,
        Self::NoWebgl,
        Self::Webgl,
        Self::NoOfflineContext,
        Self::AudioRender,
        Self::AudioContext,
        Self::Platform,
        Self::Screen,
        Self::NoPerfApi,
        Self::NoTiming,
        Self::Perf,
    ];
}

impl std::fmt::Display for ProbeSentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProbeSentinel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebglFingerprint {
    pub vendor: String,
    pub renderer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformFingerprint {
    pub platform: String,
    /// Comma-joined plugin names
    pub plugins: String,
    pub touch_points: u32,
    /// Mirrors the mouse-state counter at probe time
    pub click_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenFingerprint {
    /// "WxHxD"
    pub screen: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfFingerprint {
    pub entry_type: String,
    pub transfer_size: i64,
    pub load_time_ms: f64,
}

/// Successful probe sample. Variants mirror [`ProbeKind`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProbeSample {
    Canvas(String),
    Webgl(WebglFingerprint),
    /// Decimal sum of channel-0 magnitudes over the fingerprint window
    Audio(String),
    Platform(PlatformFingerprint),
    Screen(ScreenFingerprint),
    Language(String),
    Plugins(String),
    Performance(PerfFingerprint),
    Trajectory(TrajectoryReport),
    Anomaly(AnomalyReport),
}

pub type ProbeResult = Result<ProbeSample, ProbeSentinel>;

/// Everything gathered for one signing attempt, keyed by probe tag.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvidenceBag {
    samples: BTreeMap<ProbeKind, ProbeResult>,
}

impl EvidenceBag {
    pub fn insert(&mut self, kind: ProbeKind, result: ProbeResult) {
        self.samples.insert(kind, result);
    }

    pub fn get(&self, kind: ProbeKind) -> Option<&ProbeResult> {
        self.samples.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// How many probes produced a sentinel instead of a sample.
    pub fn sentinel_count(&self) -> usize {
        self.samples.values().filter(|r| r.is_err()).count()
    }

    pub fn platform(&self) -> Option<&PlatformFingerprint> {
        match self.samples.get(&ProbeKind::Platform) {
            Some(Ok(ProbeSample::Platform(p))) => Some(p),
            _ => None,
        }
    }

    pub fn webgl(&self) -> Option<&WebglFingerprint> {
        match self.samples.get(&ProbeKind::Webgl) {
            Some(Ok(ProbeSample::Webgl(w))) => Some(w),
            _ => None,
        }
    }

    /// Audio result verbatim: the rendered sum, or the sentinel spelling
    /// when the probe failed. `None` when audio never ran.
    pub fn audio_value(&self) -> Option<&str> {
        match self.samples.get(&ProbeKind::Audio) {
            Some(Ok(ProbeSample::Audio(s))) => Some(s.as_str()),
            Some(Err(sentinel)) => Some(sentinel.as_str()),
            _ => None,
        }
    }

    pub fn trajectory(&self) -> Option<&TrajectoryReport> {
        match self.samples.get(&ProbeKind::MouseTrajectory) {
            Some(Ok(ProbeSample::Trajectory(t))) => Some(t),
            _ => None,
        }
    }

    pub fn anomaly(&self) -> Option<&AnomalyReport> {
        match self.samples.get(&ProbeKind::AnomalyScan) {
            Some(Ok(ProbeSample::Anomaly(a))) => Some(a),
            _ => None,
        }
    }

    pub fn performance(&self) -> Option<&PerfFingerprint> {
        match self.samples.get(&ProbeKind::Performance) {
            Some(Ok(ProbeSample::Performance(p))) => Some(p),
            _ => None,
        }
    }
}

/// Orchestrates all probes and yields one evidence bag per signing attempt.
pub struct DataLoom {
    host: Arc<dyn HostEnvironment>,
    trajectory: Arc<TrajectoryRecorder>,
}

impl DataLoom {
    pub fn new(host: Arc<dyn HostEnvironment>, trajectory: Arc<TrajectoryRecorder>) -> Self {
        Self { host, trajectory }
    }

    pub fn recorder(&self) -> &TrajectoryRecorder {
        &self.trajectory
    }

    /// Run every probe the policy lists, in policy order. The bag is complete
    /// (success or sentinel per tag) before this returns.
    pub fn gather(&self, policy: &Policy) -> EvidenceBag {
        let mut bag = EvidenceBag::default();
        for kind in &policy.collectors {
            let result = self.dispatch(*kind);
            if let Err(sentinel) = &result {
                debug!(probe = kind.label(), sentinel = sentinel.as_str(), "probe fault");
            }
            bag.insert(*kind, result);
        }
        bag
    }

    fn dispatch(&self, kind: ProbeKind) -> ProbeResult {
        let host = self.host.as_ref();
        match kind {
            ProbeKind::Platform => platform::platform(host, self.trajectory.click_count()),
            ProbeKind::Screen => platform::screen(host),
            ProbeKind::Language => platform::language(host),
            ProbeKind::Plugins => platform::plugins(host),
            ProbeKind::Canvas => canvas::collect(host),
            ProbeKind::Webgl => webgl::collect(host),
            ProbeKind::Audio => audio::collect(host),
            ProbeKind::Performance => performance::collect(host),
            ProbeKind::MouseTrajectory => {
                Ok(ProbeSample::Trajectory(self.trajectory.drain_report()))
            }
            ProbeKind::AnomalyScan => Ok(ProbeSample::Anomaly(AnomalyScanner::scan(host))),
        }
    }
}
