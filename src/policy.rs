//! Capability-driven probe policy: which probes run and how they weigh into
//! the risk score. Built once at init, immutable afterwards.

use crate::host::CapabilitySnapshot;
use crate::probes::ProbeKind;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_ANOMALY_WEIGHT: f64 = 50.0;
pub const DEFAULT_TRAJECTORY_WEIGHT: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Policy {
    /// Probes to dispatch, in order. Anything absent here never runs.
    pub collectors: Vec<ProbeKind>,
    pub weights: BTreeMap<ProbeKind, f64>,
}

impl Policy {
    /// Deterministic: equal snapshots produce equal policies.
    pub fn from_capabilities(caps: &CapabilitySnapshot) -> Self {
        let mut collectors = vec![
            ProbeKind::Platform,
            ProbeKind::Screen,
            ProbeKind::Language,
            ProbeKind::Plugins,
        ];
        let mut weights = BTreeMap::new();
        weights.insert(ProbeKind::Plugins, 5.0);

        if caps.has_canvas_2d {
            collectors.push(ProbeKind::Canvas);
            weights.insert(ProbeKind::Canvas, 15.0);
        }
        if caps.has_webgl {
            collectors.push(ProbeKind::Webgl);
            weights.insert(ProbeKind::Webgl, 15.0);
        }
        // Offline rendering misbehaves on the iOS family, so the audio probe
        // is gated on both the constructor and the user-agent heuristic.
        if caps.has_offline_audio && !caps.ios_family {
            collectors.push(ProbeKind::Audio);
            weights.insert(ProbeKind::Audio, 20.0);
        }
        if caps.has_performance_timing {
            collectors.push(ProbeKind::Performance);
            weights.insert(ProbeKind::Performance, 5.0);
        }

        collectors.push(ProbeKind::MouseTrajectory);
        weights.insert(ProbeKind::MouseTrajectory, DEFAULT_TRAJECTORY_WEIGHT);
        collectors.push(ProbeKind::AnomalyScan);
        weights.insert(ProbeKind::AnomalyScan, DEFAULT_ANOMALY_WEIGHT);

        Self { collectors, weights }
    }

    pub fn includes(&self, kind: ProbeKind) -> bool {
        self.collectors.contains(&kind)
    }

    pub fn weight(&self, kind: ProbeKind) -> Option<f64> {
        self.weights.get(&kind).copied()
    }

    pub fn anomaly_weight(&self) -> f64 {
        self.weight(ProbeKind::AnomalyScan)
            .unwrap_or(DEFAULT_ANOMALY_WEIGHT)
    }

    pub fn trajectory_weight(&self) -> f64 {
        self.weight(ProbeKind::MouseTrajectory)
            .unwrap_or(DEFAULT_TRAJECTORY_WEIGHT)
    }
}
