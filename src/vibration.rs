//! Vibration feature synthesizer (C6, §4.6).
//!
//! Three sensors x three axes x six time-domain statistics (54 features)
//! plus per-sensor band-energy spectra (3 x 40 = 120) plus two
//! spectral-kurtosis values per sensor (6) = 180 features total, driven by
//! the composed `VibrationModifier` and convolved with operating state.
//! Noise floor is a function of engine-profile variant.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use statrs::statistics::Data;
use statrs::statistics::Distribution as StatrsDistribution;

use crate::constants::BANDS_PER_SENSOR;
use crate::faults::VibrationModifier;
use crate::types::{EngineProfile, WindowState};

const SAMPLES_PER_WINDOW: usize = 64;
const SENSORS: usize = 3;
const AXES: usize = 3;
const TIME_STATS_PER_AXIS: usize = 6;

pub const VIBRATION_FEATURE_COUNT: usize =
    SENSORS * AXES * TIME_STATS_PER_AXIS + SENSORS * BANDS_PER_SENSOR + SENSORS * 2;

fn noise_floor(profile: EngineProfile) -> f64 {
    match profile {
        EngineProfile::Modern => 0.015,
        EngineProfile::Older => 0.04,
    }
}

fn simulate_axis_samples<R: Rng + ?Sized>(
    rng: &mut R,
    window: &WindowState,
    modifier: &VibrationModifier,
    profile: EngineProfile,
) -> Vec<f64> {
    let base_amplitude = 0.05 + 0.4 * window.load + 0.0004 * (window.rpm / 100.0);
    let floor = noise_floor(profile);
    let shape = modifier.shape_boost;
    let band_scale: f64 = modifier.band_energy_multiplier.iter().sum::<f64>() / modifier.band_energy_multiplier.len() as f64;

    let normal = Normal::new(0.0, (base_amplitude * band_scale).max(floor)).expect("valid normal parameters");
    (0..SAMPLES_PER_WINDOW)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * (i as f64) / SAMPLES_PER_WINDOW as f64;
            let periodic = base_amplitude * 0.3 * (phase * shape).sin();
            normal.sample(rng) + periodic
        })
        .collect()
}

fn time_domain_stats(samples: &[f64]) -> [f64; TIME_STATS_PER_AXIS] {
    let data = Data::new(samples.to_vec());
    let mean = data.mean().unwrap_or(0.0);
    let std_dev = data.std_dev().unwrap_or(0.0).max(f64::EPSILON);

    let n = samples.len() as f64;
    let rms = (samples.iter().map(|v| v * v).sum::<f64>() / n).sqrt();
    let peak = samples.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    let crest = if rms > f64::EPSILON { peak / rms } else { 0.0 };
    let kurtosis = samples.iter().map(|&v| ((v - mean) / std_dev).powi(4)).sum::<f64>() / n;
    let max_val = samples.iter().cloned().fold(f64::MIN, f64::max);

    [rms, peak, crest, kurtosis, std_dev, max_val]
}

fn band_energies(modifier: &VibrationModifier, base_amplitude: f64) -> [f64; BANDS_PER_SENSOR] {
    let mut bands = [0.0; BANDS_PER_SENSOR];
    for (i, b) in bands.iter_mut().enumerate() {
        let rolloff = 1.0 / (1.0 + (i as f64) * 0.08);
        *b = base_amplitude.powi(2) * rolloff * modifier.band_energy_multiplier[i];
    }
    bands
}

fn spectral_kurtosis(modifier: &VibrationModifier) -> [f64; 2] {
    let peakiness = modifier.band_energy_multiplier.iter().cloned().fold(0.0_f64, f64::max);
    [3.0 + peakiness * 0.5, modifier.shape_boost]
}

/// Synthesizes all 180 vibration features for one window, in canonical
/// order: per sensor, per axis, the six time-domain stats; then per
/// sensor, the 40 band energies; then per sensor, the two
/// spectral-kurtosis values.
pub fn synthesize<R: Rng + ?Sized>(
    rng: &mut R,
    window: &WindowState,
    profile: EngineProfile,
    modifiers: &[VibrationModifier; SENSORS],
) -> Vec<f64> {
    let mut features = Vec::with_capacity(VIBRATION_FEATURE_COUNT);

    for sensor_modifier in modifiers.iter() {
        for _axis in 0..AXES {
            let samples = simulate_axis_samples(rng, window, sensor_modifier, profile);
            features.extend_from_slice(&time_domain_stats(&samples));
        }
    }

    let base_amplitude = 0.05 + 0.4 * window.load;
    for sensor_modifier in modifiers.iter() {
        features.extend_from_slice(&band_energies(sensor_modifier, base_amplitude));
    }

    for sensor_modifier in modifiers.iter() {
        features.extend_from_slice(&spectral_kurtosis(sensor_modifier));
    }

    features
}
