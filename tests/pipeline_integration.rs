//! End-to-end pipeline test: fleet factory -> truck-day orchestration ->
//! sidecar persistence, the same sequence `src/bin/generate.rs` drives
//! (§6.4 persisted sidecar files).

use fleetgen::fleet::build_fleet;
use fleetgen::orchestrator::run_truck_day;
use fleetgen::storage::{maintenance_log, splits, thermal_store};
use fleetgen::types::{ThermalState, TruckRuntimeState};

#[test]
fn two_day_run_persists_thermal_state_and_maintenance_log() {
    let dir = tempfile::tempdir().unwrap();
    let sim_days = 3;
    let sim_hours = f64::from(sim_days) * 24.0;

    let fleet = build_fleet(42, 4, sim_hours).unwrap();

    for truck in &fleet {
        let mut state = TruckRuntimeState::new(truck.initial_faults.clone());
        let mut log = maintenance_log::load(dir.path(), truck.truck_id);

        for day_index in 0..sim_days {
            let thermal_start = thermal_store::load_or_idle_baseline(dir.path(), truck, day_index);
            let out = run_truck_day(truck, day_index, &mut state, thermal_start, sim_hours).unwrap();

            let thermal_state = ThermalState::from_array(
                truck.truck_id,
                day_index,
                i64::from(day_index) * 86_400,
                out.end_of_day_thermal,
            );
            thermal_store::save(dir.path(), &thermal_state).unwrap();

            log.entries.extend(out.maintenance_entries);
        }

        let unresolved_codes: Vec<&str> = state.active_faults.iter().map(|f| f.mode.code()).collect();
        maintenance_log::finalize_unresolved(&mut log, &unresolved_codes, sim_days - 1);
        maintenance_log::save(dir.path(), truck.truck_id, &log).unwrap();

        // day 1's starting thermal state must equal day 0's persisted end state.
        let day0_end = thermal_store::load_or_idle_baseline(dir.path(), truck, 1);
        let reloaded = maintenance_log::load(dir.path(), truck.truck_id);
        assert_eq!(reloaded.entries.len(), log.entries.len());
        assert!(day0_end.iter().all(|v| v.is_finite()));
    }

    let computed = splits::build_splits(&fleet, 2, 1, 1).unwrap();
    splits::save(dir.path(), &computed).unwrap();

    let metadata_dir = dir.path().join("metadata");
    assert!(metadata_dir.join("train_trucks.txt").exists());
    assert!(metadata_dir.join("val_trucks.txt").exists());
    assert!(metadata_dir.join("test_trucks.txt").exists());

    let all_ids: Vec<u32> = fleet.iter().map(|t| t.truck_id).collect();
    let mut split_ids: Vec<u32> = computed.train.iter().chain(&computed.val).chain(&computed.test).copied().collect();
    split_ids.sort_unstable();
    let mut expected_ids = all_ids;
    expected_ids.sort_unstable();
    assert_eq!(split_ids, expected_ids, "splits must partition the whole fleet with no truck dropped or duplicated");
}

#[test]
fn day_zero_never_reads_a_prior_thermal_file() {
    let dir = tempfile::tempdir().unwrap();
    let fleet = build_fleet(7, 1, 24.0).unwrap();
    let truck = &fleet[0];

    // Write a day-minus-one-shaped artifact under a path day 0 must not consult.
    let bogus = ThermalState::from_array(truck.truck_id, 0, 0, [999.0; 6]);
    thermal_store::save(dir.path(), &bogus).unwrap();

    let start = thermal_store::load_or_idle_baseline(dir.path(), truck, 0);
    assert_eq!(start, truck.thermal_idle_baseline);
}
