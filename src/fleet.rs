//! Fleet factory (C1, §4.1).
//!
//! Produces the immutable `Vec<Truck>` from a master seed. Every truck's
//! static parameters, including its initial fault manifest, are fixed here
//! and never revisited by later components except through `Truck` fields.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::constants::{
    ALL_FAULT_MODES, DETECTION_PROB_STAGE2_RANGE, DETECTION_PROB_STAGE3_RANGE,
    DETECTION_PROB_STAGE4_FIXED, FAULT_TOTAL_LIFE_RANGES, INITIAL_FAULT_COUNT_PRIOR,
};
use crate::error::ConfigError;
use crate::types::{
    BearingGeometry, EngineProfile, FaultEpisode, FaultMode, Truck,
};

const MODERN_PROFILE_PROB: f64 = 0.80;

/// Per-sensor idle-baseline sampling range (°C), (min, max), one per sensor.
const THERMAL_IDLE_RANGES: [(f64, f64); 6] = [
    (15.0, 35.0),
    (15.0, 35.0),
    (20.0, 45.0),
    (25.0, 55.0),
    (30.0, 70.0),
    (15.0, 40.0),
];

/// Per-sensor Δload coefficient sampling range (°C per unit load).
const THERMAL_DELTA_LOAD_RANGES: [(f64, f64); 6] = [
    (40.0, 70.0),
    (45.0, 75.0),
    (50.0, 90.0),
    (80.0, 150.0),
    (150.0, 350.0),
    (30.0, 60.0),
];

fn validate_fault_ranges() -> Result<(), ConfigError> {
    for (mode, (min, max)) in ALL_FAULT_MODES.iter().zip(FAULT_TOTAL_LIFE_RANGES.iter()) {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::InconsistentFaultRange(*mode, *min, *max));
        }
    }
    Ok(())
}

fn sample_bearing_geometry(rng: &mut StdRng) -> BearingGeometry {
    BearingGeometry {
        n_elements: rng.gen_range(8.0_f64..16.0).round(),
        ball_diameter_mm: rng.gen_range(10.0..22.0),
        pitch_diameter_mm: rng.gen_range(60.0..110.0),
        contact_angle_deg: rng.gen_range(0.0..20.0),
    }
}

fn sample_initial_faults(rng: &mut StdRng, sim_hours: f64) -> Vec<FaultEpisode> {
    let count_dist = WeightedIndex::new(INITIAL_FAULT_COUNT_PRIOR).expect("prior weights are valid");
    let fault_count = count_dist.sample(rng);

    let mut indices: Vec<usize> = (0..ALL_FAULT_MODES.len()).collect();
    // Fisher-Yates partial shuffle to pick `fault_count` distinct modes.
    for i in 0..fault_count.min(indices.len()) {
        let j = rng.gen_range(i..indices.len());
        indices.swap(i, j);
    }

    indices[..fault_count.min(indices.len())]
        .iter()
        .map(|&idx| {
            let mode = ALL_FAULT_MODES[idx];
            let (life_min, life_max) = FAULT_TOTAL_LIFE_RANGES[idx];
            let onset = rng.gen_range(0.0..(0.5 * sim_hours).max(f64::EPSILON));
            let total_life_hours = Uniform::new(life_min, life_max).sample(rng);
            let stage2 = rng.gen_range(DETECTION_PROB_STAGE2_RANGE.0..DETECTION_PROB_STAGE2_RANGE.1);
            let stage3 = rng.gen_range(DETECTION_PROB_STAGE3_RANGE.0..DETECTION_PROB_STAGE3_RANGE.1);

            FaultEpisode {
                mode,
                onset_hours: onset,
                total_life_hours,
                detection_probs: [stage2, stage3, DETECTION_PROB_STAGE4_FIXED],
                severity: 0.0,
                detected: false,
                scheduled_inspection_day: None,
                improving: false,
                improve_tau_hours: None,
                improve_start_severity: 0.0,
                improve_start_hours: 0.0,
            }
        })
        .collect()
}

/// Builds the fleet. `sim_hours` bounds the initial-fault onset sampling
/// window (§4.1: `U(0, 0.5 * sim_hours)`).
pub fn build_fleet(master_seed: u64, truck_count: u32, sim_hours: f64) -> Result<Vec<Truck>, ConfigError> {
    validate_fault_ranges()?;
    if truck_count == 0 {
        return Err(ConfigError::InvalidFleetSize(truck_count));
    }

    let mut trucks = Vec::with_capacity(truck_count as usize);
    for truck_id in 0..truck_count {
        let truck_seed = master_seed.wrapping_add(u64::from(truck_id));
        let mut rng = StdRng::seed_from_u64(truck_seed);

        let engine_profile = if rng.gen_bool(MODERN_PROFILE_PROB) {
            EngineProfile::Modern
        } else {
            EngineProfile::Older
        };

        let mut thermal_idle_baseline = [0.0; 6];
        let mut thermal_delta_load_coeff = [0.0; 6];
        for i in 0..6 {
            let (lo, hi) = THERMAL_IDLE_RANGES[i];
            thermal_idle_baseline[i] = rng.gen_range(lo..hi);
            let (dlo, dhi) = THERMAL_DELTA_LOAD_RANGES[i];
            thermal_delta_load_coeff[i] = rng.gen_range(dlo..dhi);
        }

        let bearing_geometry = sample_bearing_geometry(&mut rng);
        let initial_faults = sample_initial_faults(&mut rng, sim_hours);

        trucks.push(Truck {
            truck_id,
            engine_profile,
            thermal_idle_baseline,
            thermal_delta_load_coeff,
            bearing_geometry,
            truck_seed,
            initial_faults,
        });
    }

    Ok(trucks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fleet_is_deterministic_for_fixed_seed() {
        let a = build_fleet(42, 20, 183.0 * 24.0).unwrap();
        let b = build_fleet(42, 20, 183.0 * 24.0).unwrap();
        for (ta, tb) in a.iter().zip(b.iter()) {
            assert_eq!(ta.truck_seed, tb.truck_seed);
            assert_eq!(ta.thermal_idle_baseline, tb.thermal_idle_baseline);
            assert_eq!(ta.initial_faults.len(), tb.initial_faults.len());
        }
    }

    #[test]
    fn different_trucks_get_distinct_seeds() {
        let fleet = build_fleet(42, 50, 183.0 * 24.0).unwrap();
        let mut seeds: Vec<u64> = fleet.iter().map(|t| t.truck_seed).collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 50);
    }

    #[test]
    fn initial_fault_modes_are_distinct_per_truck() {
        let fleet = build_fleet(7, 100, 183.0 * 24.0).unwrap();
        for truck in &fleet {
            let mut modes: Vec<FaultMode> = truck.initial_faults.iter().map(|f| f.mode).collect();
            let before = modes.len();
            modes.sort_by_key(FaultMode::index);
            modes.dedup_by_key(|m| m.index());
            assert_eq!(modes.len(), before);
            assert!(truck.initial_faults.len() <= 3);
        }
    }

    #[test]
    fn zero_trucks_is_rejected() {
        assert!(matches!(build_fleet(1, 0, 100.0), Err(ConfigError::InvalidFleetSize(0))));
    }
}
