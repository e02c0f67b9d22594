//! Fixed simulation constants.
//!
//! Everything here is read by the rest of the crate rather than
//! re-derived or hand-copied at call sites, per the external contract
//! that the Markov matrix and per-fault-mode ranges are data, not code.

use crate::types::{FaultMode, OperatingMode};

/// 60-second observation windows per simulated day.
pub const WINDOWS_PER_DAY: u32 = 1440;

/// Seconds spanned by a single window.
pub const SECONDS_PER_WINDOW: f64 = 60.0;

/// Severity thresholds mapping to stages 1..4: 0.0/0.6/0.75/0.95/1.0.
pub const STAGE_THRESHOLDS: [f64; 5] = [0.0, 0.6, 0.75, 0.95, 1.0];

/// Logistic-growth steepness for the degradation curve (§4.3).
pub const DEGRADATION_LOGISTIC_K: f64 = 5.0;

/// Mean-reversion rate of the OU-like severity noise, per simulated hour.
pub const DEGRADATION_NOISE_THETA: f64 = 0.5;

/// Standard deviation of the OU-like severity noise innovation.
pub const DEGRADATION_NOISE_SIGMA: f64 = 0.01;

/// Healthy buffer (hours) enforced before a post-repair fault may onset (§4.9.1).
pub const POST_REPAIR_HEALTHY_BUFFER_HOURS: f64 = 720.0;

/// Probability a repaired truck is assigned a new fault (§4.9.1).
pub const POST_REPAIR_NEW_FAULT_PROB: f64 = 0.70;

/// Number of frequency bands per vibration sensor in the synthesized spectrum.
pub const BANDS_PER_SENSOR: usize = 40;

/// Vibration sensor mount locations (3 sensors × 3 axes, §4.6).
pub const VIBRATION_SENSORS: [&str; 3] = ["engine_block", "turbocharger", "axle"];
pub const VIBRATION_AXES: [&str; 3] = ["x", "y", "z"];

/// Thermal sensor identifiers (6 sensors, §3/§6.4).
pub const THERMAL_SENSORS: [&str; 6] = [
    "coolant_in",
    "coolant_out",
    "oil_sump",
    "turbo_housing",
    "exhaust_manifold",
    "transmission",
];

/// Named thermal differential pairs (sensor_a, sensor_b) contributing the
/// 3 differential features in the thermal block (§4.7: 6*6 + 3 = 39).
pub const THERMAL_DIFFERENTIAL_PAIRS: [(usize, usize); 3] = [
    (4, 0), // exhaust_manifold - coolant_in
    (3, 2), // turbo_housing - oil_sump
    (1, 0), // coolant_out - coolant_in
];

/// Per-sensor physical clamp limits (°C), (min, max).
pub const THERMAL_PHYSICAL_LIMITS: [(f64, f64); 6] = [
    (-20.0, 120.0),
    (-20.0, 125.0),
    (-20.0, 150.0),
    (-20.0, 260.0),
    (-20.0, 650.0),
    (-20.0, 140.0),
];

/// First-order lag time constant (hours) per thermal sensor.
pub const THERMAL_TAU_HOURS: [f64; 6] = [0.4, 0.45, 0.6, 0.25, 0.15, 0.5];

/// Ambient coupling coefficient per thermal sensor.
pub const THERMAL_AMBIENT_COUPLING: [f64; 6] = [0.3, 0.3, 0.2, 0.15, 0.1, 0.2];

/// Markov transition matrix, rows = from-state, cols = to-state, order
/// idle, city, cruise, heavy (§6.2). Rows sum to 1.0.
pub const MARKOV_TRANSITIONS: [[f64; 4]; 4] = [
    // from idle
    [0.80, 0.14, 0.05, 0.01],
    // from city
    [0.08, 0.78, 0.12, 0.02],
    // from cruise
    [0.02, 0.08, 0.85, 0.05],
    // from heavy
    [0.02, 0.05, 0.18, 0.75],
];

/// Per-mode (rpm_min, rpm_max, load_min, load_max) ranges sampled with
/// truncated-normal noise around the midpoint (§4.2, §9 open question).
pub const MODE_RANGES: [(f64, f64, f64, f64); 4] = [
    // idle: rpm, load
    (600.0, 800.0, 0.0, 0.05),
    // city
    (900.0, 1800.0, 0.15, 0.45),
    // cruise
    (1300.0, 1700.0, 0.35, 0.65),
    // heavy
    (1500.0, 2100.0, 0.60, 0.98),
];

pub fn mode_index(mode: OperatingMode) -> usize {
    match mode {
        OperatingMode::Idle => 0,
        OperatingMode::City => 1,
        OperatingMode::Cruise => 2,
        OperatingMode::Heavy => 3,
    }
}

/// Per-fault-mode (total_life_min, total_life_max) hours.
pub const FAULT_TOTAL_LIFE_RANGES: [(f64, f64); 8] = [
    (1500.0, 3500.0), // FM-01 turbocharger bearing wear
    (1000.0, 2500.0), // FM-02 fuel injector fouling
    (2000.0, 4500.0), // FM-03 wheel-end bearing wear
    (800.0, 2000.0),  // FM-04 coolant pump cavitation
    (1200.0, 3000.0), // FM-05 alternator bearing wear
    (600.0, 1800.0),  // FM-06 EGR cooler fouling
    (400.0, 1200.0),  // FM-07 EGR leak
    (1000.0, 2800.0), // FM-08 DPF / exhaust back-pressure
];

pub const ALL_FAULT_MODES: [FaultMode; 8] = [
    FaultMode::Fm01TurboBearing,
    FaultMode::Fm02InjectorFouling,
    FaultMode::Fm03WheelBearing,
    FaultMode::Fm04CoolantCavitation,
    FaultMode::Fm05AlternatorBearing,
    FaultMode::Fm06EgrCoolerFouling,
    FaultMode::Fm07EgrLeak,
    FaultMode::Fm08DpfBackpressure,
];

/// Initial fault-count prior at fleet-factory time (§4.1): {0,1,2,3}.
pub const INITIAL_FAULT_COUNT_PRIOR: [f64; 4] = [0.30, 0.40, 0.20, 0.10];

/// Detection-probability sampling ranges per stage (stage4 is fixed).
pub const DETECTION_PROB_STAGE2_RANGE: (f64, f64) = (0.20, 0.30);
pub const DETECTION_PROB_STAGE3_RANGE: (f64, f64) = (0.60, 0.80);
pub const DETECTION_PROB_STAGE4_FIXED: f64 = 0.95;

/// Inspection scheduling delay ranges (days) by the stage at detection time.
pub const INSPECTION_DELAY_DAYS_STAGE2: (i64, i64) = (7, 21);
pub const INSPECTION_DELAY_DAYS_STAGE3: (i64, i64) = (1, 3);
pub const INSPECTION_DELAY_DAYS_STAGE4: (i64, i64) = (0, 1);

/// Inspection outcome probabilities (repair, monitor, false_positive) by stage.
pub const OUTCOME_PROBS_STAGE2: (f64, f64, f64) = (0.85, 0.10, 0.05);
pub const OUTCOME_PROBS_STAGE3: (f64, f64, f64) = (0.90, 0.08, 0.02);
pub const OUTCOME_PROBS_STAGE4: (f64, f64, f64) = (1.0, 0.0, 0.0);

/// Repair duration ranges (calendar days) by stage.
pub const REPAIR_DURATION_DAYS_STAGE2: (i64, i64) = (1, 2);
pub const REPAIR_DURATION_DAYS_STAGE3: (i64, i64) = (2, 5);
pub const REPAIR_DURATION_DAYS_STAGE4: (i64, i64) = (5, 10);

/// Monitor-improve time constant range (hours).
pub const MONITOR_IMPROVE_TAU_RANGE: (f64, f64) = (200.0, 500.0);

/// Severity below which an improving fault is considered resolved.
pub const MONITOR_IMPROVE_RESOLVE_THRESHOLD: f64 = 0.01;

/// Sentinel RUL value for healthy or improving trucks.
pub const RUL_SENTINEL_HOURS: f64 = 99999.0;

/// Fleet class-distribution acceptance bounds, validated post-run (§7, §8.7).
pub const NORMAL_FRACTION_RANGE: (f64, f64) = (0.93, 0.96);
pub const IMMINENT_FRACTION_RANGE: (f64, f64) = (0.03, 0.05);
pub const CRITICAL_FRACTION_RANGE: (f64, f64) = (0.005, 0.02);
