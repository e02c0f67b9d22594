//! Operating-state simulator (C2, §4.2).
//!
//! Four-state Markov chain over the fixed matrix in `constants`. RPM/load
//! noise is truncated-normal around each mode's range midpoint, clamped to
//! the range (the open-question resolution recorded in SPEC_FULL.md §9 /
//! DESIGN.md). Ambient temperature follows a slow daily sinusoid plus small
//! Gaussian noise.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::{mode_index, MARKOV_TRANSITIONS, MODE_RANGES};
use crate::types::{OperatingMode, WindowState};

const AMBIENT_MEAN_C: f64 = 18.0;
const AMBIENT_DAILY_AMPLITUDE_C: f64 = 8.0;
const AMBIENT_NOISE_STD_C: f64 = 0.8;

fn next_mode<R: Rng + ?Sized>(rng: &mut R, current: OperatingMode) -> OperatingMode {
    let row = MARKOV_TRANSITIONS[mode_index(current)];
    let draw: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (idx, prob) in row.iter().enumerate() {
        cumulative += prob;
        if draw < cumulative {
            return OperatingMode::from_index(idx);
        }
    }
    OperatingMode::from_index(row.len() - 1)
}

/// Samples a truncated-normal value around `mid`, clamped to `[lo, hi]`,
/// with standard deviation a quarter of the range's half-width.
fn sample_truncated_normal<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    let mid = (lo + hi) / 2.0;
    let half_width = (hi - lo) / 2.0;
    let std_dev = (half_width / 4.0).max(f64::EPSILON);
    let normal = Normal::new(mid, std_dev).expect("valid normal parameters");
    normal.sample(rng).clamp(lo, hi)
}

fn sample_ambient<R: Rng + ?Sized>(rng: &mut R, window_index: u32) -> f64 {
    let day_fraction = f64::from(window_index) / f64::from(crate::constants::WINDOWS_PER_DAY);
    let daily = AMBIENT_DAILY_AMPLITUDE_C * (2.0 * std::f64::consts::PI * (day_fraction - 0.25)).sin();
    let noise = Normal::new(0.0, AMBIENT_NOISE_STD_C)
        .expect("valid normal parameters")
        .sample(rng);
    AMBIENT_MEAN_C + daily + noise
}

/// Advances the duty cycle by one window, returning the new state.
///
/// `previous_mode` is `None` only for a truck's very first window (day 0,
/// window 0), which always starts IDLE (§4.2).
pub fn step<R: Rng + ?Sized>(
    rng: &mut R,
    previous_mode: Option<OperatingMode>,
    window_index: u32,
) -> WindowState {
    let current = previous_mode.unwrap_or(OperatingMode::Idle);
    let mode = next_mode(rng, current);
    let (rpm_lo, rpm_hi, load_lo, load_hi) = MODE_RANGES[mode_index(mode)];
    let rpm = sample_truncated_normal(rng, rpm_lo, rpm_hi);
    let load = sample_truncated_normal(rng, load_lo, load_hi);
    let ambient_c = sample_ambient(rng, window_index);

    WindowState {
        mode,
        rpm,
        load,
        ambient_c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn first_window_starts_from_idle_transition() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = step(&mut rng, None, 0);
        let (rpm_lo, rpm_hi, load_lo, load_hi) = MODE_RANGES[mode_index(state.mode)];
        assert!(state.rpm >= rpm_lo && state.rpm <= rpm_hi);
        assert!(state.load >= load_lo && state.load <= load_hi);
    }

    #[test]
    fn rpm_and_load_stay_within_mode_ranges_across_many_steps() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut mode = OperatingMode::Idle;
        for w in 0..2000 {
            let state = step(&mut rng, Some(mode), w);
            let (rpm_lo, rpm_hi, load_lo, load_hi) = MODE_RANGES[mode_index(state.mode)];
            assert!(state.rpm >= rpm_lo && state.rpm <= rpm_hi);
            assert!(state.load >= load_lo && state.load <= load_hi);
            mode = state.mode;
        }
    }

    #[test]
    fn deterministic_given_same_seed_and_sequence() {
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let mut mode_a = OperatingMode::Idle;
        let mut mode_b = OperatingMode::Idle;
        for w in 0..100 {
            let a = step(&mut rng_a, Some(mode_a), w);
            let b = step(&mut rng_b, Some(mode_b), w);
            assert_eq!(a.rpm, b.rpm);
            assert_eq!(a.load, b.load);
            assert_eq!(a.ambient_c, b.ambient_c);
            mode_a = a.mode;
            mode_b = b.mode;
        }
    }
}
