//! Core data model shared across every component (§3).

use serde::{Deserialize, Serialize};

// ============================================================================
// Engine / truck
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineProfile {
    Modern,
    Older,
}

impl EngineProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineProfile::Modern => "modern",
            EngineProfile::Older => "older",
        }
    }
}

/// Five characteristic bearing frequencies (Hz) at a reference shaft speed,
/// derived once from bearing geometry at fleet-factory time (§4.1).
///
/// Formulas follow the standard rolling-element bearing relations: BPFO/BPFI
/// (ball pass, outer/inner race), BSF (ball spin), FTF (cage / fundamental
/// train), plus the 1x shaft frequency itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BearingFrequencies {
    pub shaft_hz: f64,
    pub bpfo_hz: f64,
    pub bpfi_hz: f64,
    pub bsf_hz: f64,
    pub ftf_hz: f64,
}

/// Bearing geometry sampled per-truck; feeds `BearingFrequencies` at a given
/// shaft speed via `compute_bearing_frequencies`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BearingGeometry {
    pub n_elements: f64,
    pub ball_diameter_mm: f64,
    pub pitch_diameter_mm: f64,
    pub contact_angle_deg: f64,
}

pub fn compute_bearing_frequencies(geometry: &BearingGeometry, shaft_rpm: f64) -> BearingFrequencies {
    let shaft_hz = shaft_rpm / 60.0;
    let contact_angle_rad = geometry.contact_angle_deg.to_radians();
    let d_over_d = geometry.ball_diameter_mm / geometry.pitch_diameter_mm;
    let cos_angle = contact_angle_rad.cos();

    let bpfo = (geometry.n_elements / 2.0) * shaft_hz * (1.0 - d_over_d * cos_angle);
    let bpfi = (geometry.n_elements / 2.0) * shaft_hz * (1.0 + d_over_d * cos_angle);
    let bsf = (geometry.pitch_diameter_mm / (2.0 * geometry.ball_diameter_mm))
        * shaft_hz
        * (1.0 - (d_over_d * cos_angle).powi(2));
    let ftf = 0.5 * shaft_hz * (1.0 - d_over_d * cos_angle);

    BearingFrequencies {
        shaft_hz,
        bpfo_hz: bpfo,
        bpfi_hz: bpfi,
        bsf_hz: bsf,
        ftf_hz: ftf,
    }
}

/// Static, immutable per-truck parameters produced once by the fleet factory (C1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub truck_id: u32,
    pub engine_profile: EngineProfile,
    /// Idle-state thermal baseline (°C) per of the 6 sensors.
    pub thermal_idle_baseline: [f64; 6],
    /// Per-sensor Δload coefficient, sampled directly (not derived).
    pub thermal_delta_load_coeff: [f64; 6],
    pub bearing_geometry: BearingGeometry,
    /// Derived once at fleet-factory time; never mutated.
    pub truck_seed: u64,
    /// Fault episodes assigned at fleet-factory time (0-3, onset in the future).
    pub initial_faults: Vec<FaultEpisode>,
}

// ============================================================================
// Fault modes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultMode {
    Fm01TurboBearing,
    Fm02InjectorFouling,
    Fm03WheelBearing,
    Fm04CoolantCavitation,
    Fm05AlternatorBearing,
    Fm06EgrCoolerFouling,
    Fm07EgrLeak,
    Fm08DpfBackpressure,
}

impl FaultMode {
    pub fn code(&self) -> &'static str {
        match self {
            FaultMode::Fm01TurboBearing => "FM-01",
            FaultMode::Fm02InjectorFouling => "FM-02",
            FaultMode::Fm03WheelBearing => "FM-03",
            FaultMode::Fm04CoolantCavitation => "FM-04",
            FaultMode::Fm05AlternatorBearing => "FM-05",
            FaultMode::Fm06EgrCoolerFouling => "FM-06",
            FaultMode::Fm07EgrLeak => "FM-07",
            FaultMode::Fm08DpfBackpressure => "FM-08",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            FaultMode::Fm01TurboBearing => 0,
            FaultMode::Fm02InjectorFouling => 1,
            FaultMode::Fm03WheelBearing => 2,
            FaultMode::Fm04CoolantCavitation => 3,
            FaultMode::Fm05AlternatorBearing => 4,
            FaultMode::Fm06EgrCoolerFouling => 5,
            FaultMode::Fm07EgrLeak => 6,
            FaultMode::Fm08DpfBackpressure => 7,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        crate::constants::ALL_FAULT_MODES
            .iter()
            .find(|fm| fm.code() == code)
            .copied()
    }
}

/// Ordinal severity stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Stage1 = 1,
    Stage2 = 2,
    Stage3 = 3,
    Stage4 = 4,
}

impl Stage {
    pub fn from_severity(severity: f64) -> Self {
        let t = crate::constants::STAGE_THRESHOLDS;
        if severity < t[1] {
            Stage::Stage1
        } else if severity < t[2] {
            Stage::Stage2
        } else if severity < t[3] {
            Stage::Stage3
        } else {
            Stage::Stage4
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Stage1 => "STAGE1",
            Stage::Stage2 => "STAGE2",
            Stage::Stage3 => "STAGE3",
            Stage::Stage4 => "STAGE4",
        }
    }
}

/// One active fault instance (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultEpisode {
    pub mode: FaultMode,
    /// Onset, in continuous engine-hours since simulation start.
    pub onset_hours: f64,
    pub total_life_hours: f64,
    /// Pre-sampled detection probabilities, indexed by [stage2, stage3, stage4].
    pub detection_probs: [f64; 3],
    pub severity: f64,
    pub detected: bool,
    pub scheduled_inspection_day: Option<u32>,
    pub improving: bool,
    pub improve_tau_hours: Option<f64>,
    /// Severity at the moment monitor-improve began (decay reference point).
    pub improve_start_severity: f64,
    pub improve_start_hours: f64,
}

impl FaultEpisode {
    pub fn stage(&self) -> Stage {
        Stage::from_severity(self.severity)
    }
}

// ============================================================================
// Operating state (C2)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingMode {
    Idle,
    City,
    Cruise,
    Heavy,
}

impl OperatingMode {
    pub fn from_index(i: usize) -> Self {
        match i {
            0 => OperatingMode::Idle,
            1 => OperatingMode::City,
            2 => OperatingMode::Cruise,
            _ => OperatingMode::Heavy,
        }
    }
}

/// A single window's operating conditions, produced by C2.
#[derive(Debug, Clone, Copy)]
pub struct WindowState {
    pub mode: OperatingMode,
    pub rpm: f64,
    pub load: f64,
    pub ambient_c: f64,
}

// ============================================================================
// Thermal state (C5, §6.4)
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThermalState {
    pub truck_id: u32,
    pub day_index: u32,
    pub timestamp: i64,
    #[serde(rename = "T1")]
    pub t1: f64,
    #[serde(rename = "T2")]
    pub t2: f64,
    #[serde(rename = "T3")]
    pub t3: f64,
    #[serde(rename = "T4")]
    pub t4: f64,
    #[serde(rename = "T5")]
    pub t5: f64,
    #[serde(rename = "T6")]
    pub t6: f64,
}

impl ThermalState {
    pub fn as_array(&self) -> [f64; 6] {
        [self.t1, self.t2, self.t3, self.t4, self.t5, self.t6]
    }

    pub fn from_array(truck_id: u32, day_index: u32, timestamp: i64, values: [f64; 6]) -> Self {
        Self {
            truck_id,
            day_index,
            timestamp,
            t1: values[0],
            t2: values[1],
            t3: values[2],
            t4: values[3],
            t5: values[4],
            t6: values[5],
        }
    }

    pub fn idle_baseline(truck: &Truck, truck_id: u32, day_index: u32, timestamp: i64) -> Self {
        Self::from_array(truck_id, day_index, timestamp, truck.thermal_idle_baseline)
    }
}

// ============================================================================
// Maintenance lifecycle (C9, §3, §4.9)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Healthy,
    Degrading,
    Imminent,
    Critical,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TruckOpState {
    Operating,
    InRepair {
        fault_mode: FaultMode,
        repair_start_day: u32,
        repair_end_day: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionOutcome {
    Repair,
    Monitor,
    FalsePositive,
}

impl InspectionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionOutcome::Repair => "repair",
            InspectionOutcome::Monitor => "monitor",
            InspectionOutcome::FalsePositive => "false_positive",
        }
    }
}

/// One entry in a truck's maintenance log (§6.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceLogEntry {
    pub episode_id_before: u32,
    pub episode_id_after: u32,
    pub fault_repaired: Option<String>,
    pub detection_day: u32,
    pub detection_stage: u32,
    pub inspection_day: u32,
    pub outcome: String,
    pub repair_start_day: Option<u32>,
    pub repair_end_day: Option<u32>,
    pub return_to_service_day: Option<u32>,
}

/// The only state carried across day boundaries besides thermal state (§3, §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckRuntimeState {
    pub active_faults: Vec<FaultEpisode>,
    pub op_state: TruckOpState,
    pub episode_id: u32,
    /// Last operating mode, carried across days only if the truck was
    /// operating the previous day (§4.2).
    pub last_mode: Option<OperatingMode>,
}

impl TruckRuntimeState {
    pub fn new(initial_faults: Vec<FaultEpisode>) -> Self {
        Self {
            active_faults: initial_faults,
            op_state: TruckOpState::Operating,
            episode_id: 0,
            last_mode: None,
        }
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        if matches!(self.op_state, TruckOpState::InRepair { .. }) {
            return LifecycleState::Maintenance;
        }
        let worst = self
            .active_faults
            .iter()
            .map(|f| f.stage())
            .max();
        match worst {
            None => LifecycleState::Healthy,
            Some(Stage::Stage1) => LifecycleState::Healthy,
            Some(Stage::Stage2) => LifecycleState::Degrading,
            Some(Stage::Stage3) => LifecycleState::Imminent,
            Some(Stage::Stage4) => LifecycleState::Critical,
        }
    }
}

// ============================================================================
// Labels (C8)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub fault_mode: String,
    pub fault_severity: String,
    pub rul_hours: f64,
    pub path_a_label: String,
}

// ============================================================================
// Feature row (C7, §6.3)
// ============================================================================

/// One emitted row: 5 leading columns + 221 features + 4 labels = 230 (§6.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: i64,
    pub truck_id: i32,
    pub engine_type: String,
    pub day_index: i32,
    pub episode_id: i32,
    pub features: Vec<f64>,
    pub labels: Labels,
}

/// Schema version; bumped only by an explicit, documented contract change.
pub const SCHEMA_VERSION: u32 = 1;
