//! Fault-effect library (C4, §4.4).
//!
//! Eight fault modes as a closed enum, each mapping
//! `(operating_state, severity, rng_stream) -> (VibrationModifier, ThermalOffset)`.
//! Concurrent-fault composition: vibration band energy multiplies, shape
//! boost takes the max, thermal offsets sum (capped per sensor).
//!
//! FM-07 (EGR leak) discrete events are driven by a deterministic hash of
//! `(truck_id, day_index, window_index, episode_id)` rather than RNG, so
//! that parallel workers produce bit-identical output regardless of
//! scheduling (§4.4, §5).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::Rng;

use crate::constants::BANDS_PER_SENSOR;
use crate::types::{FaultMode, WindowState};

/// Per-sensor multiplicative energy boost across the synthesized band
/// spectrum, plus a shape-domain boost applied to kurtosis/crest factor.
#[derive(Debug, Clone)]
pub struct VibrationModifier {
    pub band_energy_multiplier: [f64; BANDS_PER_SENSOR],
    pub shape_boost: f64,
}

impl VibrationModifier {
    pub fn identity() -> Self {
        Self {
            band_energy_multiplier: [1.0; BANDS_PER_SENSOR],
            shape_boost: 1.0,
        }
    }
}

/// Additive per-sensor thermal offset (°C), pre-cap.
pub type ThermalOffset = [f64; 6];

/// Combines concurrent faults' vibration modifiers: band energy multiplies,
/// shape boost takes the max (§4.4).
pub fn compose_vibration(modifiers: &[VibrationModifier]) -> VibrationModifier {
    let mut result = VibrationModifier::identity();
    for m in modifiers {
        for (acc, &v) in result.band_energy_multiplier.iter_mut().zip(m.band_energy_multiplier.iter()) {
            *acc *= v;
        }
        result.shape_boost = result.shape_boost.max(m.shape_boost);
    }
    result
}

const THERMAL_OFFSET_CAP_C: f64 = 80.0;

/// Sums concurrent faults' thermal offsets, capping the magnitude per
/// sensor (§4.4).
pub fn compose_thermal(offsets: &[ThermalOffset]) -> ThermalOffset {
    let mut total = [0.0; 6];
    for offset in offsets {
        for (acc, &v) in total.iter_mut().zip(offset.iter()) {
            *acc += v;
        }
    }
    for v in total.iter_mut() {
        *v = v.clamp(-THERMAL_OFFSET_CAP_C, THERMAL_OFFSET_CAP_C);
    }
    total
}

/// Bands excited by a given fault mode (a subset of `0..BANDS_PER_SENSOR`),
/// used by the vibration synthesizer to shape which sensors/frequencies
/// carry the signature.
pub fn bands_excited(mode: FaultMode) -> &'static [usize] {
    match mode {
        FaultMode::Fm01TurboBearing => &[2, 3, 4, 5, 6],
        FaultMode::Fm02InjectorFouling => &[10, 11, 12],
        FaultMode::Fm03WheelBearing => &[1, 2, 3],
        FaultMode::Fm04CoolantCavitation => &[15, 16, 17, 18],
        FaultMode::Fm05AlternatorBearing => &[6, 7, 8],
        FaultMode::Fm06EgrCoolerFouling => &[20, 21],
        FaultMode::Fm07EgrLeak => &[22, 23],
        FaultMode::Fm08DpfBackpressure => &[25, 26, 27],
    }
}

/// Vibration sensor indices (into `constants::VIBRATION_SENSORS`) a fault
/// mode's vibration signature couples to. Faults that share a sensor
/// compose there; a fault never perturbs a sensor it has no mechanical
/// path to (§4.4).
pub fn vibration_sensors_coupled(mode: FaultMode) -> &'static [usize] {
    match mode {
        FaultMode::Fm01TurboBearing => &[1],
        FaultMode::Fm02InjectorFouling => &[0],
        FaultMode::Fm03WheelBearing => &[2],
        FaultMode::Fm04CoolantCavitation => &[0],
        FaultMode::Fm05AlternatorBearing => &[0],
        FaultMode::Fm06EgrCoolerFouling => &[0],
        FaultMode::Fm07EgrLeak => &[1],
        FaultMode::Fm08DpfBackpressure => &[1],
    }
}

/// Deterministic pseudo-random unit value in `[0, 1)`, used wherever a
/// fault's behavior must depend only on identity, never on scheduling.
fn deterministic_unit(truck_id: u32, day_index: u32, window_index: u32, episode_id: u32) -> f64 {
    let mut hasher = DefaultHasher::new();
    (truck_id, day_index, window_index, episode_id).hash(&mut hasher);
    let bits = hasher.finish();
    (bits >> 11) as f64 / (1u64 << 53) as f64
}

/// Computes the vibration and thermal effect of a single fault mode at the
/// given severity and operating state. `rng` drives every mode except
/// FM-07, whose discrete leak events are deterministic (see module docs).
#[allow(clippy::too_many_arguments)]
pub fn effect_for<R: Rng + ?Sized>(
    mode: FaultMode,
    severity: f64,
    window: &WindowState,
    rng: &mut R,
    truck_id: u32,
    day_index: u32,
    window_index: u32,
    episode_id: u32,
) -> (VibrationModifier, ThermalOffset) {
    let mut vib = VibrationModifier::identity();
    let mut thermal: ThermalOffset = [0.0; 6];
    let load_factor = 1.0 + window.load;

    match mode {
        FaultMode::Fm01TurboBearing => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 3.0 * severity * load_factor;
            }
            vib.shape_boost = 1.0 + 2.0 * severity;
            thermal[3] += 15.0 * severity;
            thermal[4] += 8.0 * severity;
        }
        FaultMode::Fm02InjectorFouling => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 1.5 * severity;
            }
            vib.shape_boost = 1.0 + 0.8 * severity;
            thermal[4] += 10.0 * severity * load_factor;
        }
        FaultMode::Fm03WheelBearing => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 4.0 * severity;
            }
            vib.shape_boost = 1.0 + 3.0 * severity;
        }
        FaultMode::Fm04CoolantCavitation => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 2.0 * severity;
            }
            thermal[0] += 12.0 * severity;
            thermal[1] += 18.0 * severity;
        }
        FaultMode::Fm05AlternatorBearing => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 2.5 * severity;
            }
            vib.shape_boost = 1.0 + 1.5 * severity;
            thermal[5] += 6.0 * severity;
        }
        FaultMode::Fm06EgrCoolerFouling => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 1.2 * severity;
            }
            thermal[0] += 6.0 * severity;
            thermal[4] += 10.0 * severity;
        }
        FaultMode::Fm07EgrLeak => {
            // Discrete, deterministic leak "puff" events: excited only on
            // windows whose identity hash falls below a severity-scaled
            // occurrence rate, never via RNG (bit-identical parallelism).
            let occurrence_rate = 0.05 + 0.35 * severity;
            if deterministic_unit(truck_id, day_index, window_index, episode_id) < occurrence_rate {
                for &band in bands_excited(mode) {
                    vib.band_energy_multiplier[band] *= 1.0 + 3.5 * severity;
                }
                thermal[4] += 5.0 * severity;
            }
        }
        FaultMode::Fm08DpfBackpressure => {
            for &band in bands_excited(mode) {
                vib.band_energy_multiplier[band] *= 1.0 + 1.0 * severity;
            }
            thermal[4] += 20.0 * severity * load_factor;
            thermal[3] += 5.0 * severity;
        }
    }

    // Small, mode-independent jitter keeps concurrent identical-severity
    // faults from producing exactly coincident band multipliers.
    let jitter: f64 = rng.gen_range(-0.02..0.02);
    for v in vib.band_energy_multiplier.iter_mut() {
        *v = (*v + jitter).max(0.0);
    }

    (vib, thermal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperatingMode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn window() -> WindowState {
        WindowState {
            mode: OperatingMode::Cruise,
            rpm: 1500.0,
            load: 0.4,
            ambient_c: 20.0,
        }
    }

    #[test]
    fn zero_severity_has_negligible_effect() {
        let mut rng = StdRng::seed_from_u64(1);
        let (vib, thermal) = effect_for(FaultMode::Fm01TurboBearing, 0.0, &window(), &mut rng, 1, 0, 0, 0);
        for &v in &vib.band_energy_multiplier {
            assert!((v - 1.0).abs() < 0.05);
        }
        assert!(thermal.iter().all(|&t| t.abs() < 1e-9));
    }

    #[test]
    fn fm07_is_deterministic_across_repeated_calls() {
        let mut rng_a = StdRng::seed_from_u64(5);
        let mut rng_b = StdRng::seed_from_u64(99);
        let (vib_a, therm_a) = effect_for(FaultMode::Fm07EgrLeak, 0.6, &window(), &mut rng_a, 3, 10, 500, 2);
        let (vib_b, therm_b) = effect_for(FaultMode::Fm07EgrLeak, 0.6, &window(), &mut rng_b, 3, 10, 500, 2);
        // RNG seed differs but FM-07 occurrence must not depend on it. Use a
        // midpoint threshold, not 1.0 (identity): the post-occurrence jitter
        // alone can nudge a non-occurring window's multiplier either side of
        // 1.0, but never within reach of an occurring window's value.
        let occurred_a = vib_a.band_energy_multiplier[22] > 1.5;
        let occurred_b = vib_b.band_energy_multiplier[22] > 1.5;
        assert_eq!(occurred_a, occurred_b);
        assert_eq!(therm_a[4] > 0.0, therm_b[4] > 0.0);
    }

    #[test]
    fn compose_thermal_caps_magnitude() {
        let offsets = vec![[100.0; 6], [100.0; 6]];
        let total = compose_thermal(&offsets);
        assert!(total.iter().all(|&t| t <= THERMAL_OFFSET_CAP_C));
    }

    #[test]
    fn wheel_bearing_and_turbo_bearing_couple_to_different_sensors() {
        assert_ne!(vibration_sensors_coupled(FaultMode::Fm03WheelBearing), vibration_sensors_coupled(FaultMode::Fm01TurboBearing));
    }

    #[test]
    fn compose_vibration_multiplies_energy_and_maxes_shape() {
        let mut a = VibrationModifier::identity();
        a.band_energy_multiplier[0] = 2.0;
        a.shape_boost = 1.5;
        let mut b = VibrationModifier::identity();
        b.band_energy_multiplier[0] = 3.0;
        b.shape_boost = 1.2;
        let combined = compose_vibration(&[a, b]);
        assert!((combined.band_energy_multiplier[0] - 6.0).abs() < 1e-9);
        assert!((combined.shape_boost - 1.5).abs() < 1e-9);
    }
}
