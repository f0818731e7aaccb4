// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor State Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

/// Governance operating mode.
///
/// Selection order matters and is fixed: CRITICAL is checked first
/// unconditionally (safety overrides everything), then STABILIZING,
/// then the generativity-gated pair, with OPTIMAL's stricter
/// threshold examined only after EXPLORING's looser gate passed.
/// SAFE is the fallback and the startup state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Critical,
    Stabilizing,
    Exploring,
    Optimal,
    Safe,
}

impl Mode {
    /// Whether the job scheduler should shed load in this mode.
    pub fn backpressure(self) -> bool {
        matches!(self, Self::Critical | Self::Stabilizing)
    }
}

/// Federation posture of the generativity context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FederationMode {
    Solo,
    Federated,
}

/// The three weighted components of the generativity score G*.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GComponents {
    pub progress: f64,
    pub novelty: f64,
    pub consistency: f64,
}

/// Published governor state snapshot.
///
/// Produced wholesale by every `evaluate()` tick and treated as
/// immutable by consumers (scheduler, attestor, metrics exporter) —
/// readers hold an `Arc` without synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorState {
    /// Stability margin: distance from instability, higher is safer.
    pub s: f64,
    /// Window volatility — the entropy-like signal the margin guards
    /// against.
    pub h: f64,
    /// Last derivative contribution of the PD law (k_d * de/dt).
    pub gamma: f64,
    /// Adapted learning rate, clamped to [eta_min, eta_max].
    pub eta: f64,
    /// Resonance integrity score for this tick.
    pub ris: f64,
    pub frozen: bool,
    pub mode: Mode,
    /// Scheduler backpressure recommendation for this tick.
    pub backpressure: bool,
    /// Composite generativity score.
    pub g_star: f64,
    pub g_components: GComponents,
    pub federation: FederationMode,
    pub live_peers: usize,
    /// Evaluation counter since process start.
    pub tick: u64,
    pub evaluated_at_s: f64,
}

impl GovernorState {
    /// Safe startup state, published before the first evaluation.
    pub fn startup(eta_default: f64) -> Self {
        Self {
            s: 0.0,
            h: 0.0,
            gamma: 0.0,
            eta: eta_default,
            ris: 0.0,
            frozen: false,
            mode: Mode::Safe,
            backpressure: false,
            g_star: 0.0,
            g_components: GComponents::default(),
            federation: FederationMode::Solo,
            live_peers: 0,
            tick: 0,
            evaluated_at_s: 0.0,
        }
    }
}
