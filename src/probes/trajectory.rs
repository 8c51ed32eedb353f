//! Mouse trajectory: a bounded sample buffer fed by pointer events and a
//! regularity analyzer that flags machine-like motion.

use serde::Serialize;
use std::sync::Mutex;

/// Trajectory buffer cap.
pub const MAX_SAMPLES: usize = 50;
/// Minimum spacing between accepted samples (milliseconds).
pub const MIN_SAMPLE_GAP_MS: f64 = 100.0;

/// Intervals tighter than this flag metronome-regular sampling (ms).
const REGULAR_SIGMA_MS: f64 = 10.0;
/// Adjacent slopes closer than this count as colinear.
const SLOPE_EPSILON: f64 = 0.1;
/// Share of colinear segment pairs above which the path is a straight line.
const STRAIGHT_RATIO: f64 = 0.8;

#[derive(Debug, Default)]
struct MouseState {
    x: f64,
    y: f64,
    last_sample_ms: Option<f64>,
    click_count: u64,
    buffer: Vec<[f64; 3]>,
}

/// Single owner of the process-wide mouse state. Event glue calls
/// `record_move` / `record_click`; the trajectory probe drains the buffer.
pub struct TrajectoryRecorder {
    inner: Mutex<MouseState>,
}

impl Default for TrajectoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MouseState::default()),
        }
    }

    /// Accept a pointer sample if at least [`MIN_SAMPLE_GAP_MS`] elapsed
    /// since the last accepted one. Accepted samples update the current
    /// position; they enter the buffer only while it holds fewer than
    /// [`MAX_SAMPLES`].
    pub fn record_move(&self, x: f64, y: f64, at_ms: f64) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        let accepted = match state.last_sample_ms {
            Some(last) => at_ms - last >= MIN_SAMPLE_GAP_MS,
            None => true,
        };
        if !accepted {
            return;
        }
        state.x = x;
        state.y = y;
        state.last_sample_ms = Some(at_ms);
        if state.buffer.len() < MAX_SAMPLES {
            state.buffer.push([x, y, at_ms]);
        }
    }

    /// Monotonic click counter; never reset, not even by draining.
    pub fn record_click(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.click_count += 1;
        }
    }

    pub fn click_count(&self) -> u64 {
        self.inner.lock().map(|s| s.click_count).unwrap_or(0)
    }

    pub fn position(&self) -> (f64, f64) {
        self.inner.lock().map(|s| (s.x, s.y)).unwrap_or((0.0, 0.0))
    }

    /// Snapshot and clear the buffer in one lock acquisition.
    pub fn drain(&self) -> Vec<[f64; 3]> {
        self.inner
            .lock()
            .map(|mut s| std::mem::take(&mut s.buffer))
            .unwrap_or_default()
    }

    pub fn drain_report(&self) -> TrajectoryReport {
        let points = self.drain();
        let analysis = analyze(&points);
        TrajectoryReport { points, analysis }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryReport {
    pub points: Vec<[f64; 3]>,
    pub analysis: TrajectoryAnalysis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrajectoryAnalysis {
    pub regularity_score: f64,
    pub is_straight_line: bool,
}

/// Score a drained trajectory. Fewer than 10 points is not enough signal.
pub fn analyze(points: &[[f64; 3]]) -> TrajectoryAnalysis {
    if points.len() < 10 {
        return TrajectoryAnalysis::default();
    }

    let mut score: f64 = 0.0;

    let intervals: Vec<f64> = points.windows(2).map(|w| w[1][2] - w[0][2]).collect();
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    let variance = intervals
        .iter()
        .map(|i| (i - mean) * (i - mean))
        .sum::<f64>()
        / intervals.len() as f64;
    if variance.sqrt() < REGULAR_SIGMA_MS {
        score += 0.8;
    }

    // Zero-displacement segments carry no direction; vertical ones read +inf,
    // so two verticals in a row compare as NaN and never count as colinear.
    let slopes: Vec<f64> = points
        .windows(2)
        .filter_map(|w| {
            let dx = w[1][0] - w[0][0];
            let dy = w[1][1] - w[0][1];
            if dx == 0.0 && dy == 0.0 {
                None
            } else if dx == 0.0 {
                Some(f64::INFINITY)
            } else {
                Some(dy / dx)
            }
        })
        .collect();
    let colinear = slopes
        .windows(2)
        .filter(|w| (w[1] - w[0]).abs() < SLOPE_EPSILON)
        .count();
    let segments = points.len() - 1;

    let is_straight_line = colinear as f64 / segments as f64 > STRAIGHT_RATIO;
    if is_straight_line {
        score += 1.0;
    }

    TrajectoryAnalysis {
        regularity_score: score.clamp(0.0, 1.0),
        is_straight_line,
    }
}
