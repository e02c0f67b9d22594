//! Degradation model (C3, §4.3).
//!
//! Logistic-growth severity curve plus bounded Ornstein-Uhlenbeck-like
//! mean-reverting noise. The Wiener-process variant considered during
//! design is explicitly rejected — unbounded variance would let severity
//! drift outside [0, 1] without the mean-reversion term.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::{DEGRADATION_LOGISTIC_K, DEGRADATION_NOISE_SIGMA, DEGRADATION_NOISE_THETA, MONITOR_IMPROVE_RESOLVE_THRESHOLD};
use crate::types::FaultEpisode;

/// Logistic-growth severity at a given lifetime fraction, before noise.
fn logistic_severity(t_frac: f64) -> f64 {
    let k = DEGRADATION_LOGISTIC_K;
    (f64::exp(k * t_frac) - 1.0) / (f64::exp(k) - 1.0)
}

/// Advances one active (non-improving) fault's severity by `dt_hours`,
/// given the current engine-hours clock `now_hours`.
pub fn step_active<R: Rng + ?Sized>(rng: &mut R, fault: &mut FaultEpisode, now_hours: f64, dt_hours: f64) {
    let t_frac = ((now_hours - fault.onset_hours) / fault.total_life_hours).clamp(0.0, 1.0);
    let target = logistic_severity(t_frac);

    let noise = Normal::new(0.0, DEGRADATION_NOISE_SIGMA)
        .expect("valid normal parameters")
        .sample(rng);
    let reversion = DEGRADATION_NOISE_THETA * (target - fault.severity) * dt_hours;
    // Severity never decreases while a fault is active — a downward noise
    // draw can damp the approach toward `target` but cannot undo progress
    // already made.
    fault.severity = (fault.severity + reversion + noise).max(fault.severity).clamp(0.0, 1.0);
}

/// Begins the monitor-improve resolution path (§4.3, §4.9): severity now
/// decays exponentially from its value at the moment of the decision.
pub fn begin_improvement(fault: &mut FaultEpisode, now_hours: f64, tau_hours: f64) {
    fault.improving = true;
    fault.improve_tau_hours = Some(tau_hours);
    fault.improve_start_severity = fault.severity;
    fault.improve_start_hours = now_hours;
}

/// Advances an improving fault's severity. Returns `true` once the fault
/// has resolved (severity dropped below the resolve threshold) and should
/// be removed from the active set.
pub fn step_improving(fault: &mut FaultEpisode, now_hours: f64) -> bool {
    let tau = fault.improve_tau_hours.unwrap_or(1.0).max(f64::EPSILON);
    let elapsed = now_hours - fault.improve_start_hours;
    fault.severity = fault.improve_start_severity * f64::exp(-elapsed / tau);
    fault.severity < MONITOR_IMPROVE_RESOLVE_THRESHOLD
}
