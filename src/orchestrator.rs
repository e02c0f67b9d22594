//! Truck-day orchestrator (C10, §2, §4.9, §5).
//!
//! Owns the per-window loop for a single `(truck_id, day_index)` work unit
//! and the day-boundary hook into C9. `(truck_id, day_index)` fully
//! determines this function's RNG stream (`day_seed = truck_seed * 1000 +
//! day_index`), so the result is bit-identical regardless of which worker
//! runs it or in what order (§5).

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::assembler::{self, ThermalHistory};
use crate::constants::{MONITOR_IMPROVE_RESOLVE_THRESHOLD, SECONDS_PER_WINDOW, WINDOWS_PER_DAY};
use crate::degradation;
use crate::error::GenError;
use crate::faults;
use crate::labels;
use crate::maintenance;
use crate::operating_state;
use crate::types::{FeatureRow, MaintenanceLogEntry, Truck, TruckOpState, TruckRuntimeState};
use crate::vibration;

const ROLLING_THERMAL_WINDOW: usize = 30;

pub struct TruckDayOutput {
    pub rows: Vec<FeatureRow>,
    pub end_of_day_thermal: [f64; 6],
    pub maintenance_entries: Vec<MaintenanceLogEntry>,
}

/// Runs one truck-day. `thermal_start` is the previous day's end-of-day
/// thermal vector (or the truck's idle baseline on day 0 / after a
/// repair), resolved by the caller via `storage::thermal_store`.
/// `sim_end_hours` is the simulation's total horizon, needed to bound
/// post-repair fault reassignment (§4.9.1).
pub fn run_truck_day(
    truck: &Truck,
    day_index: u32,
    state: &mut TruckRuntimeState,
    thermal_start: [f64; 6],
    sim_end_hours: f64,
) -> Result<TruckDayOutput, GenError> {
    let day_seed = truck.truck_seed.wrapping_mul(1000).wrapping_add(u64::from(day_index));
    let mut rng = StdRng::seed_from_u64(day_seed);
    let dt_hours = SECONDS_PER_WINDOW / 3600.0;
    let day_start_hours = f64::from(day_index) * 24.0;

    let in_repair_all_day = matches!(
        state.op_state,
        TruckOpState::InRepair { repair_end_day, .. } if day_index < repair_end_day
    );

    let mut thermal_current = thermal_start;
    let mut rows = Vec::new();

    if in_repair_all_day {
        info!(truck_id = truck.truck_id, day_index, "truck in repair, suppressing feature rows");
        // Parked and powered down: hold at the truck's own idle baseline
        // rather than Euler-stepping a full day at once, which would
        // overshoot and clamp to the physical floor given how small some
        // sensors' time constants are (§4.5).
        thermal_current = truck.thermal_idle_baseline;
    } else {
        let mut thermal_history = ThermalHistory::new(ROLLING_THERMAL_WINDOW);
        let mut mode_prev = state.last_mode;

        for window_index in 0..WINDOWS_PER_DAY {
            let window = operating_state::step(&mut rng, mode_prev, window_index);
            mode_prev = Some(window.mode);

            let mut vibs_by_sensor: [Vec<faults::VibrationModifier>; 3] = [Vec::new(), Vec::new(), Vec::new()];
            let mut thermals = Vec::with_capacity(state.active_faults.len());
            for (episode_idx, fault) in state.active_faults.iter().enumerate() {
                let (v, t) = faults::effect_for(
                    fault.mode,
                    fault.severity,
                    &window,
                    &mut rng,
                    truck.truck_id,
                    day_index,
                    window_index,
                    episode_idx as u32,
                );
                for &sensor in faults::vibration_sensors_coupled(fault.mode) {
                    vibs_by_sensor[sensor].push(v.clone());
                }
                thermals.push(t);
            }
            let combined_thermal = faults::compose_thermal(&thermals);
            let modifiers = [
                faults::compose_vibration(&vibs_by_sensor[0]),
                faults::compose_vibration(&vibs_by_sensor[1]),
                faults::compose_vibration(&vibs_by_sensor[2]),
            ];

            thermal_current = crate::thermal::step(thermal_current, truck, window.load, window.ambient_c, combined_thermal, dt_hours);
            thermal_history.push(thermal_current);

            let vibration_features = vibration::synthesize(&mut rng, &window, truck.engine_profile, &modifiers);
            let assembled = assembler::assemble(&window, &vibration_features, &thermal_history)?;

            let now_hours = day_start_hours + f64::from(window_index) * dt_hours;
            let timestamp = (day_index as i64) * 86_400 + (window_index as i64) * 60;
            let row_labels = labels::produce(&state.active_faults, now_hours);

            debug!(truck_id = truck.truck_id, day_index, window_index, "window assembled");

            rows.push(FeatureRow {
                timestamp,
                truck_id: truck.truck_id as i32,
                engine_type: truck.engine_profile.as_str().to_string(),
                day_index: day_index as i32,
                episode_id: state.episode_id as i32,
                features: assembled,
                labels: row_labels,
            });
        }
        state.last_mode = mode_prev;

        let day_end_hours = day_start_hours + 24.0;
        for fault in state.active_faults.iter_mut() {
            if fault.improving {
                degradation::step_improving(fault, day_end_hours);
            } else {
                degradation::step_active(&mut rng, fault, day_end_hours, 24.0);
            }
        }
        state
            .active_faults
            .retain(|f| !(f.improving && f.severity < MONITOR_IMPROVE_RESOLVE_THRESHOLD));
    }

    let maintenance_entries = maintenance::advance_day_boundary(&mut rng, state, truck, day_index, day_start_hours + 24.0, sim_end_hours);
    for entry in &maintenance_entries {
        info!(truck_id = truck.truck_id, day_index, outcome = %entry.outcome, "maintenance transition");
    }

    info!(truck_id = truck.truck_id, day_index, rows = rows.len(), "truck-day finished");

    Ok(TruckDayOutput {
        rows,
        end_of_day_thermal: thermal_current,
        maintenance_entries,
    })
}
