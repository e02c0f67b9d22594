//! Thermal model (C5, §4.5).
//!
//! Six independent first-order lag sensors. Cross-day persistence and the
//! safe-fallback-to-idle policy live in `storage::thermal_store`; this
//! module is the pure per-window physics step.

use crate::constants::{THERMAL_AMBIENT_COUPLING, THERMAL_PHYSICAL_LIMITS, THERMAL_TAU_HOURS};
use crate::faults::ThermalOffset;
use crate::types::Truck;

/// Advances all six sensors by `dt_hours`, given the current `load` and
/// `ambient_c`, plus composed fault offsets. Clamps to each sensor's
/// physical limits after the step (§4.5).
pub fn step(current: [f64; 6], truck: &Truck, load: f64, ambient_c: f64, offsets: ThermalOffset, dt_hours: f64) -> [f64; 6] {
    let mut next = [0.0; 6];
    for i in 0..6 {
        let target = truck.thermal_idle_baseline[i]
            + truck.thermal_delta_load_coeff[i] * load
            + THERMAL_AMBIENT_COUPLING[i] * ambient_c;
        let tau = THERMAL_TAU_HOURS[i];
        let raw = current[i] + (dt_hours / tau) * (target - current[i]) + offsets[i];
        let (lo, hi) = THERMAL_PHYSICAL_LIMITS[i];
        next[i] = raw.clamp(lo, hi);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BearingGeometry, EngineProfile};

    fn sample_truck() -> Truck {
        Truck {
            truck_id: 0,
            engine_profile: EngineProfile::Modern,
            thermal_idle_baseline: [20.0, 22.0, 30.0, 40.0, 60.0, 25.0],
            thermal_delta_load_coeff: [50.0, 55.0, 65.0, 110.0, 250.0, 45.0],
            bearing_geometry: BearingGeometry {
                n_elements: 10.0,
                ball_diameter_mm: 14.0,
                pitch_diameter_mm: 80.0,
                contact_angle_deg: 0.0,
            },
            truck_seed: 1,
            initial_faults: vec![],
        }
    }

    #[test]
    fn converges_toward_target_under_constant_load() {
        let truck = sample_truck();
        let mut state = truck.thermal_idle_baseline;
        for _ in 0..200 {
            state = step(state, &truck, 0.8, 20.0, [0.0; 6], 1.0 / 60.0);
        }
        let target = truck.thermal_idle_baseline[3] + truck.thermal_delta_load_coeff[3] * 0.8 + THERMAL_AMBIENT_COUPLING[3] * 20.0;
        assert!((state[3] - target).abs() < 2.0);
    }

    #[test]
    fn stays_within_physical_limits_with_large_offsets() {
        let truck = sample_truck();
        let mut state = truck.thermal_idle_baseline;
        for _ in 0..100 {
            state = step(state, &truck, 1.0, 45.0, [200.0; 6], 1.0 / 60.0);
        }
        for (i, &v) in state.iter().enumerate() {
            let (lo, hi) = THERMAL_PHYSICAL_LIMITS[i];
            assert!(v >= lo && v <= hi);
        }
    }
}
