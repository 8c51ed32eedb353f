//! Embedder seam: the host page surface the probe fabric reads.
//!
//! The warden runs inside a page; the actual browser APIs live on the other
//! side of this trait (a webview bridge in production, a scripted host in
//! tests). The fixed canvas draw plan and audio graph constants are owned by
//! this crate and handed to the host, so the fingerprint contract never
//! depends on embedder code.

use serde::{Deserialize, Serialize};

/// Host capabilities detected once at init. Equal snapshots must yield
/// equal probe policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub has_screen: bool,
    pub has_navigator: bool,
    pub has_canvas_2d: bool,
    pub has_offline_audio: bool,
    pub has_webgl: bool,
    pub has_performance_timing: bool,
    pub has_device_motion: bool,
    /// iOS-family user-agent heuristic; gates the audio probe
    pub ios_family: bool,
}

/// One text pass of the canvas plan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TextPass {
    pub fill: &'static str,
    pub at: (f64, f64),
}

/// Fixed draw plan for the canvas fingerprint. The byte-exact sequence is
/// part of the fingerprint: rectangle first, then both text passes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CanvasScript {
    pub width: u32,
    pub height: u32,
    pub text: &'static str,
    pub font: &'static str,
    pub baseline: &'static str,
    /// (x, y, w, h) of the filled rectangle
    pub rect: (f64, f64, f64, f64),
    pub rect_fill: &'static str,
    pub passes: [TextPass; 2],
}

pub const CANVAS_SCRIPT: CanvasScript = CanvasScript {
    width: 200,
    height: 60,
    text: "HiveHyde Anti-Crawler <canvas> 1.0 @!#$",
    font: "14px Arial",
    baseline: "top",
    rect: (125.0, 1.0, 62.0, 20.0),
    rect_fill: "#f60",
    passes: [
        TextPass { fill: "#069", at: (2.0, 15.0) },
        TextPass { fill: "rgba(102,204,0,0.7)", at: (4.0, 17.0) },
    ],
};

/// Dynamics compressor settings for the audio graph. Hosts skip any
/// parameter whose setter the platform lacks.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompressorSpec {
    pub threshold: f64,
    pub knee: f64,
    pub ratio: f64,
    pub reduction: f64,
    pub attack: f64,
    pub release: f64,
}

/// Offline rendering graph: oscillator → compressor → destination,
/// started at t=0.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AudioGraphSpec {
    pub channels: u32,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub oscillator: &'static str,
    pub frequency_hz: f64,
    pub compressor: CompressorSpec,
}

pub const AUDIO_GRAPH: AudioGraphSpec = AudioGraphSpec {
    channels: 2,
    sample_rate: 44_100,
    duration_secs: 1.0,
    oscillator: "triangle",
    frequency_hz: 10_000.0,
    compressor: CompressorSpec {
        threshold: -50.0,
        knee: 40.0,
        ratio: 12.0,
        reduction: -20.0,
        attack: 0.0,
        release: 0.25,
    },
};

/// Vendor/renderer pair read off a WebGL context. Unmasked fields come from
/// the debug-renderer-info extension when the host has it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebglContextInfo {
    pub vendor: String,
    pub renderer: String,
    pub unmasked_vendor: Option<String>,
    pub unmasked_renderer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorSnapshot {
    pub platform: String,
    pub language: String,
    pub plugins: Vec<String>,
    pub max_touch_points: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

/// Navigation timing as the host exposes it: the modern navigation entry
/// when available, legacy timing otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavigationTiming {
    Modern {
        entry_type: String,
        transfer_size: i64,
        duration_ms: f64,
    },
    Legacy {
        navigation_start: f64,
        load_event_end: f64,
    },
}

/// Raw automation signals the anomaly scanner interprets.
#[derive(Debug, Clone, Default)]
pub struct AutomationSurface {
    /// `navigator.webdriver` value, when the property reads as a boolean
    pub webdriver: Option<bool>,
    /// Descriptor of the webdriver property, when one is defined at all
    pub webdriver_descriptor: Option<PropertyDescriptor>,
    /// Shape of the Chrome runtime object, when present
    pub chrome_runtime: Option<ChromeRuntimeShape>,
    /// Source text of built-in and freshly declared functions
    pub tostring: ToStringSamples,
    /// Stack trace captured from a thrown probe error
    pub stack_trace: Option<String>,
    pub notifications: NotificationsState,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyDescriptor {
    pub configurable: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ChromeRuntimeShape {
    /// Whether the `csi` timing function exists and is callable
    pub csi_callable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ToStringSamples {
    /// toString() of a native built-in; must mention `native code`
    pub native_function: Option<String>,
    /// toString() of a function the host just declared
    pub user_function: Option<String>,
    /// Body text the declared function must echo back
    pub user_body: String,
}

#[derive(Debug, Clone, Default)]
pub enum NotificationsState {
    /// Permission query result plus the legacy `Notification.permission`
    Available {
        query_state: String,
        legacy_permission: String,
    },
    #[default]
    Missing,
    Errored,
}

/// Opaque host-side failure. Probes translate these into sentinel errors;
/// the message only ever reaches debug logs.
#[derive(Debug, Clone)]
pub struct HostError(pub String);

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audio failures keep their phase so the probe can pick the right sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFault {
    /// No offline context constructor on this host
    NoOfflineContext,
    /// Graph construction failed
    GraphSetup,
    /// The rendering callback failed
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingFault {
    NoPerfApi,
    NoTiming,
    Failed,
}

/// The page surface. Implemented by the embedding layer; every method is a
/// read, and none may block for non-trivial time.
pub trait HostEnvironment: Send + Sync {
    fn capabilities(&self) -> CapabilitySnapshot;

    /// Execute the draw plan and return the canvas data URL.
    fn render_canvas(&self, script: &CanvasScript) -> Result<String, HostError>;

    /// `Ok(None)` when neither `webgl` nor `experimental-webgl` is obtainable.
    fn webgl_context(&self) -> Result<Option<WebglContextInfo>, HostError>;

    /// Render the offline graph and return channel-0 samples.
    fn render_offline_audio(&self, spec: &AudioGraphSpec) -> Result<Vec<f32>, AudioFault>;

    fn navigator(&self) -> Result<NavigatorSnapshot, HostError>;

    fn screen(&self) -> Result<ScreenSnapshot, HostError>;

    fn navigation_timing(&self) -> Result<NavigationTiming, TimingFault>;

    fn automation_surface(&self) -> AutomationSurface;
}
