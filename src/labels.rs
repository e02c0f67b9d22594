//! Label producer (C8, §4.8).
//!
//! Ground truth is read directly off internal fault-episode state, never
//! re-derived from the synthesized features.

use crate::constants::RUL_SENTINEL_HOURS;
use crate::types::{FaultEpisode, Labels, Stage};

const IMMINENT_CRITICAL_BOUNDARY_SEVERITY: f64 = 0.85;

/// Picks the worst active fault by stage, ties broken by earliest onset
/// (§4.8). Returns `None` when the truck has no active faults.
fn dominant_fault(active_faults: &[FaultEpisode]) -> Option<&FaultEpisode> {
    active_faults.iter().max_by(|a, b| {
        a.stage()
            .cmp(&b.stage())
            .then_with(|| b.onset_hours.partial_cmp(&a.onset_hours).unwrap_or(std::cmp::Ordering::Equal))
    })
}

fn path_a_label(fault: Option<&FaultEpisode>) -> &'static str {
    match fault {
        None => "NORMAL",
        Some(f) => match f.stage() {
            Stage::Stage1 | Stage::Stage2 => "NORMAL",
            Stage::Stage3 => {
                if f.severity < IMMINENT_CRITICAL_BOUNDARY_SEVERITY {
                    "IMMINENT"
                } else {
                    "CRITICAL"
                }
            }
            Stage::Stage4 => "CRITICAL",
        },
    }
}

/// Remaining useful life in hours until the dominant fault's `total_life_hours`
/// is reached, or the sentinel value when healthy or on the monitor-improve
/// path (§4.8).
fn rul_hours(fault: Option<&FaultEpisode>, now_hours: f64) -> f64 {
    match fault {
        None => RUL_SENTINEL_HOURS,
        Some(f) if f.improving => RUL_SENTINEL_HOURS,
        Some(f) => (f.onset_hours + f.total_life_hours - now_hours).max(0.0),
    }
}

/// Produces the four ground-truth labels for one window. `now_hours` is
/// the simulation-wide engine-hours clock at this window.
pub fn produce(active_faults: &[FaultEpisode], now_hours: f64) -> Labels {
    let dominant = dominant_fault(active_faults);
    Labels {
        fault_mode: dominant.map_or_else(|| "HEALTHY".to_string(), |f| f.mode.code().to_string()),
        fault_severity: dominant.map_or("HEALTHY", |f| f.stage().label()).to_string(),
        rul_hours: rul_hours(dominant, now_hours),
        path_a_label: path_a_label(dominant).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FaultMode;

    fn fault(severity: f64) -> FaultEpisode {
        FaultEpisode {
            mode: FaultMode::Fm01TurboBearing,
            onset_hours: 0.0,
            total_life_hours: 2000.0,
            detection_probs: [0.25, 0.7, 0.95],
            severity,
            detected: false,
            scheduled_inspection_day: None,
            improving: false,
            improve_tau_hours: None,
            improve_start_severity: 0.0,
            improve_start_hours: 0.0,
        }
    }

    #[test]
    fn healthy_truck_gets_normal_label_and_sentinel_rul() {
        let labels = produce(&[], 100.0);
        assert_eq!(labels.path_a_label, "NORMAL");
        assert_eq!(labels.rul_hours, crate::constants::RUL_SENTINEL_HOURS);
        assert_eq!(labels.fault_mode, "HEALTHY");
        assert_eq!(labels.fault_severity, "HEALTHY");
    }

    #[test]
    fn early_stage3_is_imminent_late_is_critical() {
        let early = fault(0.80);
        assert_eq!(path_a_label(Some(&early)), "IMMINENT");
        let late = fault(0.90);
        assert_eq!(path_a_label(Some(&late)), "CRITICAL");
    }

    #[test]
    fn stage4_is_always_critical() {
        let f = fault(0.97);
        assert_eq!(path_a_label(Some(&f)), "CRITICAL");
    }

    #[test]
    fn improving_fault_gets_sentinel_rul() {
        let mut f = fault(0.5);
        f.improving = true;
        let labels = produce(&[f], 500.0);
        assert_eq!(labels.rul_hours, crate::constants::RUL_SENTINEL_HOURS);
    }

    #[test]
    fn multiple_faults_report_the_worst_stage_tie_broken_by_earliest_onset() {
        let mut older_onset = fault(0.62);
        older_onset.onset_hours = 10.0;
        let mut newer_onset = fault(0.65);
        newer_onset.onset_hours = 500.0;
        let labels = produce(&[newer_onset, older_onset], 600.0);
        assert_eq!(labels.fault_severity, "STAGE2");
        // both stage 2; earliest onset (10.0) must win the tie-break.
        assert_eq!(labels.rul_hours, (10.0 + 2000.0 - 600.0_f64).max(0.0));
    }
}
