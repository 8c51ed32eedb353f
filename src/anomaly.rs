//! Automation-signal scanner. Interprets the raw surface the host exposes
//! into the flags the risk scorer weighs.

use crate::host::{AutomationSurface, HostEnvironment, NotificationsState};
use serde::Serialize;

const STACK_KEYWORDS: [&str; 3] = ["puppeteer", "webdriver", "phantom"];
const MIN_STACK_FRAMES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackAnomaly {
    Clear,
    NoStack,
    ContainsKeyword,
    StackTooShort,
}

impl StackAnomaly {
    pub fn is_anomalous(&self) -> bool {
        !matches!(self, Self::Clear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSignal {
    Clear,
    Denied,
    NoPermissionsApi,
    PermissionsError,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Truthy automation flag on navigator
    pub webdriver: bool,
    /// The webdriver property descriptor exists and is configurable;
    /// genuine browsers typically have no descriptor at all
    pub webdriver_tampered: bool,
    /// Chrome-runtime shape without a callable `csi` timing function
    pub headless_chrome: bool,
    /// Built-in or user-function source text does not read back intact
    pub tostring_tampered: bool,
    pub stack_anomaly: StackAnomaly,
    pub permissions: PermissionSignal,
}

pub struct AnomalyScanner;

impl AnomalyScanner {
    pub fn scan(host: &dyn HostEnvironment) -> AnomalyReport {
        AnomalyReport::from_surface(&host.automation_surface())
    }
}

impl AnomalyReport {
    pub fn from_surface(surface: &AutomationSurface) -> Self {
        let webdriver = surface.webdriver == Some(true);

        let webdriver_tampered = surface
            .webdriver_descriptor
            .map_or(false, |d| d.configurable);

        let headless_chrome = surface.chrome_runtime.map_or(false, |c| !c.csi_callable);

        let native_hooked = surface
            .tostring
            .native_function
            .as_deref()
            .map_or(false, |src| !src.contains("native code"));
        let user_hooked = surface
            .tostring
            .user_function
            .as_deref()
            .map_or(false, |src| !src.contains(&surface.tostring.user_body));
        let tostring_tampered = native_hooked || user_hooked;

        let stack_anomaly = match surface.stack_trace.as_deref() {
            None => StackAnomaly::NoStack,
            Some(stack) => {
                let lower = stack.to_lowercase();
                if STACK_KEYWORDS.iter().any(|k| lower.contains(k)) {
                    StackAnomaly::ContainsKeyword
                } else if stack.lines().count() < MIN_STACK_FRAMES {
                    StackAnomaly::StackTooShort
                } else {
                    StackAnomaly::Clear
                }
            }
        };

        let permissions = match &surface.notifications {
            NotificationsState::Available {
                query_state,
                legacy_permission,
            } if query_state == "denied" && legacy_permission == "denied" => {
                PermissionSignal::Denied
            }
            NotificationsState::Available { .. } => PermissionSignal::Clear,
            NotificationsState::Missing => PermissionSignal::NoPermissionsApi,
            NotificationsState::Errored => PermissionSignal::PermissionsError,
        };

        Self {
            webdriver,
            webdriver_tampered,
            headless_chrome,
            tostring_tampered,
            stack_anomaly,
            permissions,
        }
    }
}
