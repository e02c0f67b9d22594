//! Feature vector assembler (C7, §4.7, §6.3).
//!
//! Concatenates 2 conditioning + 180 vibration + 39 thermal (6 sensors x 6
//! rolling statistics + 3 differentials) = 221 features, in the canonical
//! order that is the external contract. A length mismatch is always a
//! fatal `SchemaError`, never silently truncated or padded.

use std::collections::VecDeque;

use crate::constants::THERMAL_DIFFERENTIAL_PAIRS;
use crate::error::SchemaError;
use crate::types::WindowState;

pub const CONDITIONING_FEATURE_COUNT: usize = 2;
pub const THERMAL_FEATURE_COUNT: usize = 39;
pub const TOTAL_FEATURE_COUNT: usize =
    CONDITIONING_FEATURE_COUNT + crate::vibration::VIBRATION_FEATURE_COUNT + THERMAL_FEATURE_COUNT;

const RPM_NORMALIZATION: f64 = 2500.0;

/// Rolling buffer of recent per-window thermal vectors, used to compute
/// within-window-horizon statistics (mean/min/max/std/rate-of-change)
/// rather than the bare instantaneous reading. Maintained by the caller
/// (the truck-day orchestrator) across consecutive windows of the same day.
#[derive(Debug, Clone)]
pub struct ThermalHistory {
    buffer: VecDeque<[f64; 6]>,
    capacity: usize,
}

impl ThermalHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, state: [f64; 6]) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(state);
    }

    fn stats_for_sensor(&self, i: usize) -> [f64; 6] {
        let current = self.buffer.back().map_or(0.0, |s| s[i]);
        let values: Vec<f64> = self.buffer.iter().map(|s| s[i]).collect();
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let previous = if self.buffer.len() >= 2 {
            self.buffer[self.buffer.len() - 2][i]
        } else {
            current
        };
        let rate_of_change = current - previous;
        [current, mean, min, max, std_dev, rate_of_change]
    }

    /// 6 sensors x 6 stats + 3 named differential features (§4.7).
    pub fn features(&self) -> [f64; THERMAL_FEATURE_COUNT] {
        let mut out = [0.0; THERMAL_FEATURE_COUNT];
        let mut idx = 0;
        for sensor in 0..6 {
            for v in self.stats_for_sensor(sensor) {
                out[idx] = v;
                idx += 1;
            }
        }
        let current = self.buffer.back().copied().unwrap_or([0.0; 6]);
        for &(a, b) in THERMAL_DIFFERENTIAL_PAIRS.iter() {
            out[idx] = current[a] - current[b];
            idx += 1;
        }
        out
    }
}

fn conditioning_features(window: &WindowState) -> [f64; CONDITIONING_FEATURE_COUNT] {
    [window.rpm / RPM_NORMALIZATION, window.load]
}

/// Assembles the canonical 221-feature vector for one window.
pub fn assemble(window: &WindowState, vibration: &[f64], thermal_history: &ThermalHistory) -> Result<Vec<f64>, SchemaError> {
    let mut features = Vec::with_capacity(TOTAL_FEATURE_COUNT);
    features.extend_from_slice(&conditioning_features(window));
    features.extend_from_slice(vibration);
    features.extend_from_slice(&thermal_history.features());

    if features.len() != TOTAL_FEATURE_COUNT {
        return Err(SchemaError::WrongFeatureCount(features.len()));
    }
    Ok(features)
}
