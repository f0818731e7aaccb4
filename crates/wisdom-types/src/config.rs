// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{WisdomError, WisdomResult};

/// Runtime configuration for the Wisdom Governor.
///
/// Every threshold named in the governance mode table, the PD gains,
/// and the store horizons live here. None of them are hardcoded in the
/// engines; the surrounding service supplies this struct once at
/// process start and `validate()` refuses to let an ill-defined
/// control law run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Coherence window capacity in samples (one per hour).
    /// Default: 168 (seven days at hourly cadence).
    pub window_hours: usize,

    /// Minimum samples before `stability` is statistically trusted.
    /// Below this the window reports a neutral 0.5.
    /// Default: 24 (one day of hourly samples).
    pub min_samples_for_stability: usize,

    /// Peer staleness horizon in seconds for liveness queries.
    /// Default: 300.
    pub peer_max_age_s: f64,

    /// Live peers required before federation may engage.
    /// Default: 2.
    pub min_peers: usize,

    /// Federation hysteresis interval in seconds: a transition
    /// condition must hold continuously this long before it commits.
    /// Default: 120.
    pub hysteresis_interval_s: f64,

    /// Generativity baseline while operating solo. Default: 0.30.
    pub g0_solo: f64,

    /// Generativity baseline while federated. Default: 0.60.
    pub g0_federated: f64,

    /// Stability margin below which the governor freezes.
    /// Default: 0.05.
    pub critical_margin: f64,

    /// Stability margin below which the governor stabilizes.
    /// Default: 0.15.
    pub stabilizing_margin: f64,

    /// Margin the PD law steers toward. Default: 0.25.
    pub target_margin: f64,

    /// Generativity gate for EXPLORING. Default: 0.40.
    pub exploring_g_threshold: f64,

    /// Stricter generativity gate for OPTIMAL, checked only after
    /// the EXPLORING gate passed. Default: 0.70.
    pub optimal_g_threshold: f64,

    /// G* component weights (progress / novelty / consistency).
    /// Must sum to 1.0. Defaults: 0.4 / 0.3 / 0.3.
    pub w_progress: f64,
    pub w_novelty: f64,
    pub w_consistency: f64,

    /// PD proportional gain. Default: 0.5.
    pub k_p: f64,

    /// PD derivative gain. Default: 0.1.
    pub k_d: f64,

    /// Learning-rate bounds and resting value.
    /// Defaults: 0.001 / 0.01 / 0.1.
    pub eta_min: f64,
    pub eta_default: f64,
    pub eta_max: f64,

    /// Linear pull strength from the PD output toward the active
    /// mode's eta target, in [0, 1]. Default: 0.5.
    pub eta_pull: f64,

    /// Latency-penalty ramp bounds in seconds (penalty 0 below the
    /// floor, 1 above the ceiling). Defaults: 2 h / 24 h.
    pub latency_floor_s: f64,
    pub latency_ceiling_s: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            window_hours: 168,
            min_samples_for_stability: 24,
            peer_max_age_s: 300.0,
            min_peers: 2,
            hysteresis_interval_s: 120.0,
            g0_solo: 0.30,
            g0_federated: 0.60,
            critical_margin: 0.05,
            stabilizing_margin: 0.15,
            target_margin: 0.25,
            exploring_g_threshold: 0.40,
            optimal_g_threshold: 0.70,
            w_progress: 0.4,
            w_novelty: 0.3,
            w_consistency: 0.3,
            k_p: 0.5,
            k_d: 0.1,
            eta_min: 0.001,
            eta_default: 0.01,
            eta_max: 0.1,
            eta_pull: 0.5,
            latency_floor_s: 2.0 * 3600.0,
            latency_ceiling_s: 24.0 * 3600.0,
        }
    }
}

impl GovernorConfig {
    /// Validate configuration parameters.
    ///
    /// A misconfigured process must fail fast here with a message
    /// naming the offending threshold, rather than run with an
    /// ill-defined control law.
    pub fn validate(&self) -> WisdomResult<()> {
        if self.window_hours == 0 {
            return Err(WisdomError::Config(
                "window_hours must be >= 1".to_string(),
            ));
        }
        if self.min_samples_for_stability == 0 {
            return Err(WisdomError::Config(
                "min_samples_for_stability must be >= 1".to_string(),
            ));
        }
        if !(self.peer_max_age_s > 0.0) {
            return Err(WisdomError::Config(format!(
                "peer_max_age_s must be > 0, got {}",
                self.peer_max_age_s
            )));
        }
        if self.min_peers == 0 {
            return Err(WisdomError::Config("min_peers must be >= 1".to_string()));
        }
        if !(self.hysteresis_interval_s > 0.0) {
            return Err(WisdomError::Config(format!(
                "hysteresis_interval_s must be > 0, got {}",
                self.hysteresis_interval_s
            )));
        }
        for (name, v) in [
            ("g0_solo", self.g0_solo),
            ("g0_federated", self.g0_federated),
            ("exploring_g_threshold", self.exploring_g_threshold),
            ("optimal_g_threshold", self.optimal_g_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(WisdomError::Config(format!(
                    "{name} must be in [0, 1], got {v}"
                )));
            }
        }
        if self.optimal_g_threshold < self.exploring_g_threshold {
            return Err(WisdomError::Config(format!(
                "optimal_g_threshold ({}) must be >= exploring_g_threshold ({})",
                self.optimal_g_threshold, self.exploring_g_threshold
            )));
        }
        if !self.critical_margin.is_finite() || !self.stabilizing_margin.is_finite() {
            return Err(WisdomError::Config(
                "critical_margin and stabilizing_margin must be finite".to_string(),
            ));
        }
        if self.critical_margin >= self.stabilizing_margin {
            return Err(WisdomError::Config(format!(
                "critical_margin ({}) must be < stabilizing_margin ({})",
                self.critical_margin, self.stabilizing_margin
            )));
        }
        let w_sum = self.w_progress + self.w_novelty + self.w_consistency;
        if (w_sum - 1.0).abs() > 1e-9 {
            return Err(WisdomError::Config(format!(
                "w_progress + w_novelty + w_consistency must equal 1.0, got {w_sum}"
            )));
        }
        if self.w_progress < 0.0 || self.w_novelty < 0.0 || self.w_consistency < 0.0 {
            return Err(WisdomError::Config(
                "G* weights must be non-negative".to_string(),
            ));
        }
        for (name, v) in [("k_p", self.k_p), ("k_d", self.k_d)] {
            if !v.is_finite() || v < 0.0 {
                return Err(WisdomError::Config(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if !(self.eta_min > 0.0) {
            return Err(WisdomError::Config(format!(
                "eta_min must be > 0, got {}",
                self.eta_min
            )));
        }
        if self.eta_min > self.eta_max {
            return Err(WisdomError::Config(format!(
                "eta_min ({}) must be <= eta_max ({})",
                self.eta_min, self.eta_max
            )));
        }
        if !(self.eta_min..=self.eta_max).contains(&self.eta_default) {
            return Err(WisdomError::Config(format!(
                "eta_default ({}) must be within [eta_min, eta_max] = [{}, {}]",
                self.eta_default, self.eta_min, self.eta_max
            )));
        }
        if !(0.0..=1.0).contains(&self.eta_pull) {
            return Err(WisdomError::Config(format!(
                "eta_pull must be in [0, 1], got {}",
                self.eta_pull
            )));
        }
        if !(self.latency_floor_s >= 0.0) || self.latency_floor_s >= self.latency_ceiling_s {
            return Err(WisdomError::Config(format!(
                "latency ramp requires 0 <= latency_floor_s < latency_ceiling_s, got {} / {}",
                self.latency_floor_s, self.latency_ceiling_s
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> WisdomResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| WisdomError::Config(format!("JSON parse error: {e}")))
    }
}
