//! Sidecar file I/O (§6.4).
//!
//! Every writer in this module writes to a temp file in the same directory
//! and renames it into place, so a crash mid-write never leaves a
//! half-written file behind for a resuming run to trip over.

pub mod maintenance_log;
pub mod splits;
pub mod thermal_store;

use std::fs;
use std::io;
use std::path::Path;

/// Serializes `value` to `path` atomically: write to `path.tmp`, then
/// rename over the destination. The rename is atomic on the same
/// filesystem, which `output_dir` is assumed to be.
pub fn write_json_atomically<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Resumability helper: `true` if a truck-day's output frame already exists
/// under `output_dir`, so an external orchestration layer can skip it.
pub fn already_has_output(output_dir: &Path, truck_id: u32, day_index: u32) -> bool {
    frame_path(output_dir, truck_id, day_index).exists()
}

pub fn frame_path(output_dir: &Path, truck_id: u32, day_index: u32) -> std::path::PathBuf {
    output_dir
        .join("frames")
        .join(format!("truck_{truck_id}"))
        .join(format!("day_{day_index}.jsonl"))
}

/// Writes the day's JSON Lines rows atomically (temp file + rename).
pub fn write_frame_atomically(output_dir: &Path, truck_id: u32, day_index: u32, lines: &[String]) -> io::Result<()> {
    let path = frame_path(output_dir, truck_id, day_index);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("jsonl.tmp");
    fs::write(&tmp_path, lines.join("\n"))?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
