//! Per-truck maintenance log persistence (§4.9, §6.4).
//!
//! `metadata/truck_<id>/maintenance_log.json`. Every detection/inspection/
//! repair cycle is appended; faults unresolved at simulation end are
//! appended separately with outcome `"simulation_end"`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::write_json_atomically;
use crate::types::MaintenanceLogEntry;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub entries: Vec<MaintenanceLogEntry>,
}

fn path_for(output_dir: &Path, truck_id: u32) -> PathBuf {
    output_dir.join("metadata").join(format!("truck_{truck_id}")).join("maintenance_log.json")
}

pub fn load(output_dir: &Path, truck_id: u32) -> MaintenanceLog {
    let path = path_for(output_dir, truck_id);
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

pub fn save(output_dir: &Path, truck_id: u32, log: &MaintenanceLog) -> std::io::Result<()> {
    write_json_atomically(&path_for(output_dir, truck_id), log)
}

/// Appends entries for faults still active at simulation end, marked with
/// the `"simulation_end"` outcome (§4.9).
pub fn finalize_unresolved(log: &mut MaintenanceLog, unresolved_fault_codes: &[&str], last_day: u32) {
    for code in unresolved_fault_codes {
        log.entries.push(MaintenanceLogEntry {
            episode_id_before: 0,
            episode_id_after: 0,
            fault_repaired: Some((*code).to_string()),
            detection_day: last_day,
            detection_stage: 0,
            inspection_day: last_day,
            outcome: "simulation_end".to_string(),
            repair_start_day: None,
            repair_end_day: None,
            return_to_service_day: None,
        });
    }
}
