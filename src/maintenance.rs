//! Maintenance lifecycle engine (C9, §4.9).
//!
//! A pure `(state, event) -> state` state machine advanced once per day
//! boundary. Scheduling is tracked per fault (`FaultEpisode::detected`,
//! `FaultEpisode::scheduled_inspection_day`), not by one truck-wide flag,
//! so several faults can be detected and awaiting inspection at once.
//! `TruckOpState::InRepair` is the only truck-wide state: detection trials
//! run for every undetected fault whenever the truck is not in repair, and
//! due inspections are resolved in fixed fault-mode order. If an earlier
//! inspection that day sends the truck into repair, any other fault whose
//! inspection falls on the same day has its own inspection cancelled — the
//! repair about to start resolves every active fault anyway (§4.9 item 6).

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::constants::{
    ALL_FAULT_MODES, FAULT_TOTAL_LIFE_RANGES, INSPECTION_DELAY_DAYS_STAGE2, INSPECTION_DELAY_DAYS_STAGE3,
    INSPECTION_DELAY_DAYS_STAGE4, MONITOR_IMPROVE_TAU_RANGE, OUTCOME_PROBS_STAGE2, OUTCOME_PROBS_STAGE3,
    OUTCOME_PROBS_STAGE4, POST_REPAIR_HEALTHY_BUFFER_HOURS, POST_REPAIR_NEW_FAULT_PROB, REPAIR_DURATION_DAYS_STAGE2,
    REPAIR_DURATION_DAYS_STAGE3, REPAIR_DURATION_DAYS_STAGE4,
};
use crate::degradation;
use crate::types::{FaultEpisode, FaultMode, InspectionOutcome, MaintenanceLogEntry, Stage, Truck, TruckOpState, TruckRuntimeState};

fn detection_prob_for_stage(fault: &FaultEpisode, stage: Stage) -> f64 {
    match stage {
        Stage::Stage1 => 0.0,
        Stage::Stage2 => fault.detection_probs[0],
        Stage::Stage3 => fault.detection_probs[1],
        Stage::Stage4 => fault.detection_probs[2],
    }
}

fn inspection_delay_range(stage: Stage) -> (i64, i64) {
    match stage {
        Stage::Stage1 | Stage::Stage2 => INSPECTION_DELAY_DAYS_STAGE2,
        Stage::Stage3 => INSPECTION_DELAY_DAYS_STAGE3,
        Stage::Stage4 => INSPECTION_DELAY_DAYS_STAGE4,
    }
}

fn outcome_probs(stage: Stage) -> (f64, f64, f64) {
    match stage {
        Stage::Stage1 | Stage::Stage2 => OUTCOME_PROBS_STAGE2,
        Stage::Stage3 => OUTCOME_PROBS_STAGE3,
        Stage::Stage4 => OUTCOME_PROBS_STAGE4,
    }
}

fn repair_duration_range(stage: Stage) -> (i64, i64) {
    match stage {
        Stage::Stage1 | Stage::Stage2 => REPAIR_DURATION_DAYS_STAGE2,
        Stage::Stage3 => REPAIR_DURATION_DAYS_STAGE3,
        Stage::Stage4 => REPAIR_DURATION_DAYS_STAGE4,
    }
}

fn sample_outcome<R: Rng + ?Sized>(rng: &mut R, stage: Stage) -> InspectionOutcome {
    let (p_repair, p_monitor, _p_false_positive) = outcome_probs(stage);
    let draw: f64 = rng.gen();
    if draw < p_repair {
        InspectionOutcome::Repair
    } else if draw < p_repair + p_monitor {
        InspectionOutcome::Monitor
    } else {
        InspectionOutcome::FalsePositive
    }
}

fn sample_day_offset<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (i64, i64)) -> i64 {
    if lo == hi {
        lo
    } else {
        Uniform::new_inclusive(lo, hi).sample(rng)
    }
}

/// Runs an independent Bernoulli detection trial for every undetected fault
/// at or above stage 2, in fixed fault-mode order. Each fault schedules its
/// own inspection day on success; a success for one fault does not stop the
/// trial for any other (§4.9 item 6).
fn run_detection_trials<R: Rng + ?Sized>(rng: &mut R, state: &mut TruckRuntimeState, day_index: u32) {
    let mut candidates: Vec<usize> = (0..state.active_faults.len())
        .filter(|&i| !state.active_faults[i].detected && !state.active_faults[i].improving && state.active_faults[i].stage() >= Stage::Stage2)
        .collect();
    candidates.sort_by_key(|&i| state.active_faults[i].mode.index());

    for idx in candidates {
        let fault = &mut state.active_faults[idx];
        let stage = fault.stage();
        let prob = detection_prob_for_stage(fault, stage);
        if rng.gen_bool(prob.clamp(0.0, 1.0)) {
            fault.detected = true;
            let delay = sample_day_offset(rng, inspection_delay_range(stage));
            let inspection_day = day_index + u32::try_from(delay.max(0)).unwrap_or(0);
            fault.scheduled_inspection_day = Some(inspection_day);
        }
    }
}

/// §4.9.1: onset = `return_hours + healthy_buffer + U(0, sim_end - return_hours -
/// healthy_buffer)`. No fault is assigned if the remaining horizon is
/// shorter than the healthy buffer.
fn pick_post_repair_fault<R: Rng + ?Sized>(
    rng: &mut R,
    excluded_modes: &[FaultMode],
    return_hours: f64,
    sim_end_hours: f64,
) -> Option<FaultEpisode> {
    let remaining = sim_end_hours - return_hours - POST_REPAIR_HEALTHY_BUFFER_HOURS;
    if remaining <= 0.0 {
        return None;
    }

    let available: Vec<usize> = (0..ALL_FAULT_MODES.len())
        .filter(|&i| !excluded_modes.contains(&ALL_FAULT_MODES[i]))
        .collect();
    if available.is_empty() {
        return None;
    }
    let chosen_idx = available[rng.gen_range(0..available.len())];
    let mode = ALL_FAULT_MODES[chosen_idx];
    let (life_min, life_max) = FAULT_TOTAL_LIFE_RANGES[chosen_idx];
    let stage2 = rng.gen_range(crate::constants::DETECTION_PROB_STAGE2_RANGE.0..crate::constants::DETECTION_PROB_STAGE2_RANGE.1);
    let stage3 = rng.gen_range(crate::constants::DETECTION_PROB_STAGE3_RANGE.0..crate::constants::DETECTION_PROB_STAGE3_RANGE.1);
    let onset_hours = return_hours + POST_REPAIR_HEALTHY_BUFFER_HOURS + rng.gen_range(0.0..remaining);

    Some(FaultEpisode {
        mode,
        onset_hours,
        total_life_hours: rng.gen_range(life_min..life_max),
        detection_probs: [stage2, stage3, crate::constants::DETECTION_PROB_STAGE4_FIXED],
        severity: 0.0,
        detected: false,
        scheduled_inspection_day: None,
        improving: false,
        improve_tau_hours: None,
        improve_start_severity: 0.0,
        improve_start_hours: 0.0,
    })
}

/// Resolves one fault's due inspection, mutating `state.op_state` on a
/// repair outcome. Returns the log entry for the inspection.
fn resolve_inspection<R: Rng + ?Sized>(
    rng: &mut R,
    state: &mut TruckRuntimeState,
    fault_idx: usize,
    inspection_day: u32,
    day_index: u32,
    now_hours: f64,
) -> MaintenanceLogEntry {
    let fault_mode = state.active_faults[fault_idx].mode;
    let stage = state.active_faults[fault_idx].stage();
    let outcome = sample_outcome(rng, stage);

    match outcome {
        InspectionOutcome::Repair => {
            let duration = sample_day_offset(rng, repair_duration_range(stage)).max(1) as u32;
            let repair_end_day = day_index + duration;
            state.op_state = TruckOpState::InRepair {
                fault_mode,
                repair_start_day: day_index,
                repair_end_day,
            };
            MaintenanceLogEntry {
                episode_id_before: state.episode_id,
                episode_id_after: state.episode_id,
                fault_repaired: None,
                detection_day: inspection_day,
                detection_stage: stage as u32,
                inspection_day,
                outcome: outcome.as_str().to_string(),
                repair_start_day: Some(day_index),
                repair_end_day: Some(repair_end_day),
                return_to_service_day: None,
            }
        }
        InspectionOutcome::Monitor => {
            if rng.gen_bool(0.5) {
                let tau = rng.gen_range(MONITOR_IMPROVE_TAU_RANGE.0..MONITOR_IMPROVE_TAU_RANGE.1);
                degradation::begin_improvement(&mut state.active_faults[fault_idx], now_hours, tau);
            }
            MaintenanceLogEntry {
                episode_id_before: state.episode_id,
                episode_id_after: state.episode_id,
                fault_repaired: None,
                detection_day: inspection_day,
                detection_stage: stage as u32,
                inspection_day,
                outcome: outcome.as_str().to_string(),
                repair_start_day: None,
                repair_end_day: None,
                return_to_service_day: None,
            }
        }
        InspectionOutcome::FalsePositive => {
            state.active_faults[fault_idx].detected = false;
            state.active_faults[fault_idx].scheduled_inspection_day = None;
            MaintenanceLogEntry {
                episode_id_before: state.episode_id,
                episode_id_after: state.episode_id,
                fault_repaired: None,
                detection_day: inspection_day,
                detection_stage: stage as u32,
                inspection_day,
                outcome: outcome.as_str().to_string(),
                repair_start_day: None,
                repair_end_day: None,
                return_to_service_day: None,
            }
        }
    }
}

/// Advances one truck's maintenance lifecycle by one day boundary. Returns
/// every log entry worth recording — ordinary days return none, but a day
/// can produce more than one (a cancelled collision plus a repair start, or
/// two independent inspections resolving without either triggering repair).
pub fn advance_day_boundary<R: Rng + ?Sized>(
    rng: &mut R,
    state: &mut TruckRuntimeState,
    _truck: &Truck,
    day_index: u32,
    now_hours: f64,
    sim_end_hours: f64,
) -> Vec<MaintenanceLogEntry> {
    if let TruckOpState::InRepair {
        fault_mode,
        repair_start_day,
        repair_end_day,
    } = state.op_state.clone()
    {
        if day_index < repair_end_day {
            return Vec::new();
        }
        // A repair resolves every active fault, not only the one that
        // triggered it (§4.9 item 3, §8 Scenario F).
        let previously_active: Vec<FaultMode> = state.active_faults.iter().map(|f| f.mode).collect();
        state.active_faults.clear();
        let episode_before = state.episode_id;
        state.episode_id += 1;
        state.op_state = TruckOpState::Operating;
        state.last_mode = None;

        if rng.gen_bool(POST_REPAIR_NEW_FAULT_PROB) {
            if let Some(new_fault) = pick_post_repair_fault(rng, &previously_active, now_hours, sim_end_hours) {
                state.active_faults.push(new_fault);
            }
        }

        return vec![MaintenanceLogEntry {
            episode_id_before: episode_before,
            episode_id_after: state.episode_id,
            fault_repaired: Some(fault_mode.code().to_string()),
            detection_day: repair_start_day,
            detection_stage: 4,
            inspection_day: repair_start_day,
            outcome: InspectionOutcome::Repair.as_str().to_string(),
            repair_start_day: Some(repair_start_day),
            repair_end_day: Some(repair_end_day),
            return_to_service_day: Some(day_index),
        }];
    }

    let mut due: Vec<usize> = (0..state.active_faults.len())
        .filter(|&i| state.active_faults[i].scheduled_inspection_day == Some(day_index))
        .collect();
    due.sort_by_key(|&i| state.active_faults[i].mode.index());

    let mut entries = Vec::new();
    for fault_idx in due.drain(..) {
        if matches!(state.op_state, TruckOpState::InRepair { .. }) {
            // An earlier inspection resolved this same day already sent the
            // truck into repair; this fault's own inspection collides with
            // it and is cancelled — the repair about to start resolves it
            // too (§4.9 item 6).
            state.active_faults[fault_idx].detected = false;
            state.active_faults[fault_idx].scheduled_inspection_day = None;
            continue;
        }
        let inspection_day = state.active_faults[fault_idx].scheduled_inspection_day.unwrap_or(day_index);
        entries.push(resolve_inspection(rng, state, fault_idx, inspection_day, day_index, now_hours));
    }

    if !matches!(state.op_state, TruckOpState::InRepair { .. }) {
        run_detection_trials(rng, state, day_index);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BearingGeometry, EngineProfile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn truck() -> Truck {
        Truck {
            truck_id: 0,
            engine_profile: EngineProfile::Modern,
            thermal_idle_baseline: [20.0; 6],
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

    fn stage3_fault() -> FaultEpisode {
        FaultEpisode {
            mode: FaultMode::Fm03WheelBearing,
            onset_hours: 0.0,
            total_life_hours: 1000.0,
            detection_probs: [0.25, 1.0, 0.95],
            severity: 0.80,
            detected: false,
            scheduled_inspection_day: None,
            improving: false,
            improve_tau_hours: None,
            improve_start_severity: 0.0,
            improve_start_hours: 0.0,
        }
    }

    #[test]
    fn detection_schedules_inspection_without_touching_op_state() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = TruckRuntimeState::new(vec![stage3_fault()]);
        let t = truck();
        advance_day_boundary(&mut rng, &mut state, &t, 10, 2400.0, 999_999.0);
        assert!(state.active_faults[0].detected);
        assert!(state.active_faults[0].scheduled_inspection_day.is_some());
        assert_eq!(state.op_state, TruckOpState::Operating);
    }

    #[test]
    fn stage4_inspection_always_repairs() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut fault = stage3_fault();
        fault.severity = 0.97;
        fault.detected = true;
        fault.scheduled_inspection_day = Some(15);
        let mut state = TruckRuntimeState::new(vec![fault]);
        let t = truck();
        let entries = advance_day_boundary(&mut rng, &mut state, &t, 15, 3600.0, 999_999.0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, "repair");
        assert!(matches!(state.op_state, TruckOpState::InRepair { .. }));
    }

    #[test]
    fn episode_id_increments_only_on_repair_completion() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = TruckRuntimeState::new(vec![]);
        state.op_state = TruckOpState::InRepair {
            fault_mode: FaultMode::Fm03WheelBearing,
            repair_start_day: 10,
            repair_end_day: 12,
        };
        state.active_faults.push(stage3_fault());
        let before = state.episode_id;
        let t = truck();
        let entries = advance_day_boundary(&mut rng, &mut state, &t, 12, 2880.0, 999_999.0);
        assert_eq!(entries.len(), 1);
        assert_eq!(state.episode_id, before + 1);
        assert_eq!(entries[0].episode_id_after, before + 1);
        assert!(state.active_faults.iter().all(|f| f.mode != FaultMode::Fm03WheelBearing));
    }

    #[test]
    fn false_positive_clears_detection_without_repair() {
        // `detection_probs` only gates whether a detection trial succeeds;
        // once an inspection is due its outcome is drawn from the fixed
        // stage outcome table (5% false-positive at stage 2). Sweep seeds
        // until one lands there and check the cleared state.
        let mut found = false;
        for seed in 0..500u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut fault = stage3_fault();
            fault.detected = true;
            fault.scheduled_inspection_day = Some(5);
            fault.severity = 0.60; // stage2
            let mut state = TruckRuntimeState::new(vec![fault]);
            let t = truck();
            let entries = advance_day_boundary(&mut rng, &mut state, &t, 5, 1200.0, 999_999.0);
            assert_eq!(entries.len(), 1);
            if entries[0].outcome == "false_positive" {
                assert!(!state.active_faults[0].detected);
                assert!(state.active_faults[0].scheduled_inspection_day.is_none());
                assert_eq!(state.op_state, TruckOpState::Operating);
                found = true;
                break;
            }
        }
        assert!(found, "no seed in 0..500 produced a false-positive outcome");
    }

    /// §4.9 item 6: two faults with independently scheduled inspections on
    /// the same day. The earlier one (by fault-mode order) repairs; the
    /// later one's inspection collides with the now-started repair and is
    /// cancelled rather than resolved on its own.
    #[test]
    fn concurrent_inspection_collision_cancels_the_later_faults_inspection() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut repairing_fault = stage3_fault();
        repairing_fault.mode = FaultMode::Fm01TurboBearing;
        repairing_fault.severity = 0.97; // stage4, always repairs
        repairing_fault.detected = true;
        repairing_fault.scheduled_inspection_day = Some(20);

        let mut colliding_fault = stage3_fault();
        colliding_fault.mode = FaultMode::Fm03WheelBearing;
        colliding_fault.severity = 0.97; // stage4 too, would also always repair on its own
        colliding_fault.detected = true;
        colliding_fault.scheduled_inspection_day = Some(20);

        let mut state = TruckRuntimeState::new(vec![repairing_fault, colliding_fault]);
        let t = truck();
        let entries = advance_day_boundary(&mut rng, &mut state, &t, 20, 4800.0, 999_999.0);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, "repair");
        assert!(matches!(state.op_state, TruckOpState::InRepair { fault_mode: FaultMode::Fm01TurboBearing, .. }));

        let colliding = state.active_faults.iter().find(|f| f.mode == FaultMode::Fm03WheelBearing).unwrap();
        assert!(!colliding.detected);
        assert!(colliding.scheduled_inspection_day.is_none());
    }
}
