//! Cross-day thermal-state persistence (§4.5, §6.4).
//!
//! `thermal_state/truck_<id>/day_<d>.json`. Day `d+1` reads day `d`'s
//! vector for the same truck; a missing or corrupt file fails safe to
//! fresh idle baselines, logged as a warning rather than a hard error.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::storage::write_json_atomically;
use crate::types::{ThermalState, Truck};

fn path_for(output_dir: &Path, truck_id: u32, day_index: u32) -> PathBuf {
    output_dir
        .join("thermal_state")
        .join(format!("truck_{truck_id}"))
        .join(format!("day_{day_index}.json"))
}

pub fn save(output_dir: &Path, state: &ThermalState) -> std::io::Result<()> {
    write_json_atomically(&path_for(output_dir, state.truck_id, state.day_index), state)
}

/// Loads the end-of-previous-day thermal state, falling back to the
/// truck's idle baseline (with a warning) if the file is missing or
/// fails to parse (§4.5).
pub fn load_or_idle_baseline(output_dir: &Path, truck: &Truck, day_index: u32) -> [f64; 6] {
    if day_index == 0 {
        return truck.thermal_idle_baseline;
    }
    let path = path_for(output_dir, truck.truck_id, day_index - 1);
    match std::fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str::<ThermalState>(&text) {
            Ok(state) => state.as_array(),
            Err(err) => {
                warn!(truck_id = truck.truck_id, day_index, path = %path.display(), error = %err, "corrupt thermal state, falling back to idle baseline");
                truck.thermal_idle_baseline
            }
        },
        Err(err) => {
            warn!(truck_id = truck.truck_id, day_index, path = %path.display(), error = %err, "missing thermal state, falling back to idle baseline");
            truck.thermal_idle_baseline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BearingGeometry, EngineProfile};

    fn truck() -> Truck {
        Truck {
            truck_id: 3,
            engine_profile: EngineProfile::Modern,
            thermal_idle_baseline: [21.0; 6],
            thermal_delta_load_coeff: [50.0; 6],
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
    fn round_trips_across_day_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let t = truck();
        let state = ThermalState::from_array(t.truck_id, 5, 1000, [99.0, 98.0, 97.0, 96.0, 95.0, 94.0]);
        save(dir.path(), &state).unwrap();
        let loaded = load_or_idle_baseline(dir.path(), &t, 6);
        assert_eq!(loaded, [99.0, 98.0, 97.0, 96.0, 95.0, 94.0]);
    }

    #[test]
    fn missing_file_falls_back_to_idle_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let t = truck();
        let loaded = load_or_idle_baseline(dir.path(), &t, 3);
        assert_eq!(loaded, t.thermal_idle_baseline);
    }

    #[test]
    fn day_zero_always_starts_from_idle_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let t = truck();
        let state = ThermalState::from_array(t.truck_id, 0, 0, [50.0; 6]);
        // Even a present day -1 style artifact should never be consulted for day 0.
        save(dir.path(), &state).unwrap();
        let loaded = load_or_idle_baseline(dir.path(), &t, 0);
        assert_eq!(loaded, t.thermal_idle_baseline);
    }
}
