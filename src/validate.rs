//! Fleet-level class-distribution validator (§7, §8).
//!
//! Checked once per completed run, not per truck-day: a single slow truck
//! or a short smoke run is expected to fall outside these bounds, so
//! callers should only invoke this after a full-fleet generation.

use crate::constants::{CRITICAL_FRACTION_RANGE, IMMINENT_FRACTION_RANGE, NORMAL_FRACTION_RANGE};
use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassCounts {
    pub normal: u64,
    pub imminent: u64,
    pub critical: u64,
}

impl ClassCounts {
    pub fn total(&self) -> u64 {
        self.normal + self.imminent + self.critical
    }

    pub fn record(&mut self, path_a_label: &str) {
        match path_a_label {
            "NORMAL" => self.normal += 1,
            "IMMINENT" => self.imminent += 1,
            "CRITICAL" => self.critical += 1,
            _ => {}
        }
    }
}

/// Checks NORMAL 93-96% / IMMINENT 3-5% / CRITICAL 0.5-2% (§7, §8.7).
pub fn validate_class_distribution(counts: &ClassCounts) -> Result<(), SchemaError> {
    let total = counts.total();
    if total == 0 {
        return Err(SchemaError::DistributionOutOfBounds("no labeled rows to validate".to_string()));
    }
    let normal_frac = counts.normal as f64 / total as f64;
    let imminent_frac = counts.imminent as f64 / total as f64;
    let critical_frac = counts.critical as f64 / total as f64;

    let mut problems = Vec::new();
    if !(NORMAL_FRACTION_RANGE.0..=NORMAL_FRACTION_RANGE.1).contains(&normal_frac) {
        problems.push(format!("normal fraction {normal_frac:.4} outside {NORMAL_FRACTION_RANGE:?}"));
    }
    if !(IMMINENT_FRACTION_RANGE.0..=IMMINENT_FRACTION_RANGE.1).contains(&imminent_frac) {
        problems.push(format!("imminent fraction {imminent_frac:.4} outside {IMMINENT_FRACTION_RANGE:?}"));
    }
    if !(CRITICAL_FRACTION_RANGE.0..=CRITICAL_FRACTION_RANGE.1).contains(&critical_frac) {
        problems.push(format!("critical fraction {critical_frac:.4} outside {CRITICAL_FRACTION_RANGE:?}"));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::DistributionOutOfBounds(problems.join("; ")))
    }
}
