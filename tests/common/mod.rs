#![allow(dead_code)]
//! Shared fixtures: a scripted host environment and a minimal TCP stub for
//! the session endpoint.

use hivehyde_anti::host::{
    AudioFault, AutomationSurface, CanvasScript, CapabilitySnapshot, HostEnvironment, HostError,
    NavigationTiming, NavigatorSnapshot, ScreenSnapshot, TimingFault, ToStringSamples,
    WebglContextInfo,
};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_KEY: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
pub const TEST_TOKEN: &str = "tok-fixture-01";

/// Scripted page surface: every probe input is a plain field.
pub struct MockHost {
    pub caps: CapabilitySnapshot,
    pub canvas: Result<String, HostError>,
    pub webgl: Result<Option<WebglContextInfo>, HostError>,
    pub audio: Result<Vec<f32>, AudioFault>,
    pub navigator: Result<NavigatorSnapshot, HostError>,
    pub screen: Result<ScreenSnapshot, HostError>,
    pub timing: Result<NavigationTiming, TimingFault>,
    pub surface: AutomationSurface,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            caps: CapabilitySnapshot {
                has_screen: true,
                has_navigator: true,
                has_canvas_2d: true,
                has_offline_audio: true,
                has_webgl: true,
                has_performance_timing: true,
                has_device_motion: false,
                ios_family: false,
            },
            canvas: Ok("data:image/png;base64,fixture".to_string()),
            webgl: Ok(Some(WebglContextInfo {
                vendor: "WebKit".to_string(),
                renderer: "WebKit WebGL".to_string(),
                unmasked_vendor: Some("Intel Inc.".to_string()),
                unmasked_renderer: Some("Intel Iris OpenGL Engine".to_string()),
            })),
            audio: Ok(sine_window()),
            navigator: Ok(NavigatorSnapshot {
                platform: "MacIntel".to_string(),
                language: "en-US".to_string(),
                plugins: vec!["PDF Viewer".to_string(), "Chrome PDF Viewer".to_string()],
                max_touch_points: 0,
            }),
            screen: Ok(ScreenSnapshot {
                width: 1920,
                height: 1080,
                color_depth: 24,
            }),
            timing: Ok(NavigationTiming::Modern {
                entry_type: "navigate".to_string(),
                transfer_size: 18_321,
                duration_ms: 742.5,
            }),
            surface: human_surface(),
        }
    }
}

/// Samples whose fingerprint window is non-zero.
fn sine_window() -> Vec<f32> {
    (0..6000).map(|i| ((i as f32) * 0.01).sin() * 0.5).collect()
}

/// A surface a genuine desktop browser would expose.
pub fn human_surface() -> AutomationSurface {
    AutomationSurface {
        webdriver: Some(false),
        webdriver_descriptor: None,
        chrome_runtime: None,
        tostring: ToStringSamples {
            native_function: Some("function toString() { [native code] }".to_string()),
            user_function: Some("function probe() { return 42; }".to_string()),
            user_body: "return 42;".to_string(),
        },
        stack_trace: Some("Error: probe\n    at scan (app.js:10:5)\n    at gather (app.js:22:3)\n    at sign (app.js:40:9)".to_string()),
        notifications: hivehyde_anti::host::NotificationsState::Available {
            query_state: "prompt".to_string(),
            legacy_permission: "default".to_string(),
        },
    }
}

impl HostEnvironment for MockHost {
    fn capabilities(&self) -> CapabilitySnapshot {
        self.caps
    }

    fn render_canvas(&self, _script: &CanvasScript) -> Result<String, HostError> {
        self.canvas.clone()
    }

    fn webgl_context(&self) -> Result<Option<WebglContextInfo>, HostError> {
        self.webgl.clone()
    }

    fn render_offline_audio(
        &self,
        _spec: &hivehyde_anti::host::AudioGraphSpec,
    ) -> Result<Vec<f32>, AudioFault> {
        self.audio.clone()
    }

    fn navigator(&self) -> Result<NavigatorSnapshot, HostError> {
        self.navigator.clone()
    }

    fn screen(&self) -> Result<ScreenSnapshot, HostError> {
        self.screen.clone()
    }

    fn navigation_timing(&self) -> Result<NavigationTiming, TimingFault> {
        self.timing.clone()
    }

    fn automation_surface(&self) -> AutomationSurface {
        self.surface.clone()
    }
}

#[derive(Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay_ms: u64,
}

impl StubResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay_ms: 0,
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay_ms: 0,
        }
    }

    pub fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

pub fn ok_envelope(key: &str, token: &str) -> String {
    format!(r#"{{"code":0,"data":{{"key":"{key}","token":"{token}"}},"msg":"ok"}}"#)
}

/// One-thread-per-connection stub for `/warden/init`. Serves the scripted
/// responses in order (the last one repeats) and counts hits.
pub struct StubInitServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubInitServer {
    pub fn spawn(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in = hits.clone();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let hit = hits_in.fetch_add(1, Ordering::SeqCst);
                let response = responses[hit.min(responses.len() - 1)].clone();
                std::thread::spawn(move || {
                    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                    let mut line = String::new();
                    let _ = reader.read_line(&mut line);
                    let mut content_length = 0usize;
                    loop {
                        let mut header = String::new();
                        if reader.read_line(&mut header).unwrap_or(0) == 0 {
                            break;
                        }
                        let header = header.trim_end();
                        if header.is_empty() {
                            break;
                        }
                        if let Some(v) = header
                            .to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(str::trim)
                            .and_then(|v| v.parse::<usize>().ok())
                        {
                            content_length = v;
                        }
                    }
                    if content_length > 0 {
                        let mut body = vec![0u8; content_length];
                        let _ = reader.read_exact(&mut body);
                    }

                    if response.delay_ms > 0 {
                        std::thread::sleep(Duration::from_millis(response.delay_ms));
                    }
                    let reason = if response.status == 200 { "OK" } else { "ERR" };
                    let payload = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        response.status,
                        reason,
                        response.body.len(),
                        response.body
                    );
                    let _ = stream.write_all(payload.as_bytes());
                    let _ = stream.flush();
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
