//! Train/val/test split files (§6.4): `metadata/{train,val,test}_trucks.txt`,
//! one truck id per line, stratified by engine-profile variant so each
//! split carries a representative modern/older mix.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::{EngineProfile, Truck};

#[derive(Debug, Clone, Default)]
pub struct Splits {
    pub train: Vec<u32>,
    pub val: Vec<u32>,
    pub test: Vec<u32>,
}

/// Stratifies `trucks` by engine profile, then distributes each stratum
/// across train/val/test in proportion to `train_count`/`val_count`/`test_count`.
pub fn build_splits(trucks: &[Truck], train_count: u32, val_count: u32, test_count: u32) -> Result<Splits, ConfigError> {
    let total = train_count + val_count + test_count;
    if total as usize != trucks.len() {
        return Err(ConfigError::InvalidSplitSizes(train_count, val_count, test_count, trucks.len() as u32));
    }

    let mut modern: Vec<u32> = trucks.iter().filter(|t| t.engine_profile == EngineProfile::Modern).map(|t| t.truck_id).collect();
    let mut older: Vec<u32> = trucks.iter().filter(|t| t.engine_profile == EngineProfile::Older).map(|t| t.truck_id).collect();
    modern.sort_unstable();
    older.sort_unstable();

    let modern_frac = modern.len() as f64 / trucks.len() as f64;

    let mut splits = Splits::default();
    let targets = [
        (train_count, &mut splits.train),
        (val_count, &mut splits.val),
        (test_count, &mut splits.test),
    ];

    for (count, bucket) in targets {
        let modern_take = ((count as f64) * modern_frac).round() as usize;
        let modern_take = modern_take.min(modern.len());
        bucket.extend(modern.drain(..modern_take));
        let older_take = (count as usize).saturating_sub(modern_take).min(older.len());
        bucket.extend(older.drain(..older_take));
    }

    // Any leftover from rounding goes to test, deterministically.
    splits.test.extend(modern.drain(..));
    splits.test.extend(older.drain(..));

    Ok(splits)
}

fn write_list(path: &Path, ids: &[u32]) -> std::io::Result<()> {
    let text: String = ids.iter().map(|id| format!("{id}\n")).collect();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn save(output_dir: &Path, splits: &Splits) -> std::io::Result<()> {
    let metadata_dir = output_dir.join("metadata");
    write_list(&metadata_dir.join("train_trucks.txt"), &splits.train)?;
    write_list(&metadata_dir.join("val_trucks.txt"), &splits.val)?;
    write_list(&metadata_dir.join("test_trucks.txt"), &splits.test)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BearingGeometry;

    fn truck(id: u32, profile: EngineProfile) -> Truck {
        Truck {
            truck_id: id,
            engine_profile: profile,
            thermal_idle_baseline: [20.0; 6],
            thermal_delta_load_coeff: [50.0; 6],
            bearing_geometry: BearingGeometry {
                n_elements: 10.0,
                ball_diameter_mm: 14.0,
                pitch_diameter_mm: 80.0,
                contact_angle_deg: 0.0,
            },
            truck_seed: u64::from(id),
            initial_faults: vec![],
        }
    }

    #[test]
    fn split_sizes_match_requested_counts() {
        let trucks: Vec<Truck> = (0..200)
            .map(|i| truck(i, if i % 5 == 0 { EngineProfile::Older } else { EngineProfile::Modern }))
            .collect();
        let splits = build_splits(&trucks, 120, 50, 30).unwrap();
        assert_eq!(splits.train.len() + splits.val.len() + splits.test.len(), 200);
    }

    #[test]
    fn rejects_mismatched_totals() {
        let trucks: Vec<Truck> = (0..10).map(|i| truck(i, EngineProfile::Modern)).collect();
        assert!(build_splits(&trucks, 5, 2, 2).is_err());
    }

    #[test]
    fn splits_are_disjoint() {
        let trucks: Vec<Truck> = (0..50)
            .map(|i| truck(i, if i % 3 == 0 { EngineProfile::Older } else { EngineProfile::Modern }))
            .collect();
        let splits = build_splits(&trucks, 30, 12, 8).unwrap();
        let mut all: Vec<u32> = splits.train.iter().chain(splits.val.iter()).chain(splits.test.iter()).copied().collect();
        let before = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), before);
    }
}
