// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Resonance Integrity Scorer (RIS)
// ─────────────────────────────────────────────────────────────────────
//! Composite trust metric combining window stability with an external
//! ethics/compliance score.
//!
//! The composite is the two-factor geometric mean
//! `sqrt(stability * ethics)`; the three-factor cube-root form with a
//! controller-latency penalty is retained as a named alternative
//! (`compute_ris_with_latency`) until the two variants are reconciled.
//! Either way the score is fail-closed: a zero component poisons trust
//! instead of being averaged away.

use std::sync::Arc;

use wisdom_types::signal::EthicsCheck;
use wisdom_types::GovernorConfig;

/// Fraction of compliance checks passed; 1.0 when no checks are
/// configured (full compliance by convention, not omission-as-failure).
pub fn ethics_score(checks: &[EthicsCheck]) -> f64 {
    if checks.is_empty() {
        return 1.0;
    }
    let passed = checks.iter().filter(|c| c.passed).count() as f64;
    passed / checks.len() as f64
}

/// Stateless RIS computation bound to the configured latency ramp.
pub struct IntegrityScorer {
    latency_floor_s: f64,
    latency_ceiling_s: f64,
}

impl IntegrityScorer {
    pub fn new(latency_floor_s: f64, latency_ceiling_s: f64) -> Self {
        Self {
            latency_floor_s,
            latency_ceiling_s,
        }
    }

    pub fn from_config(config: &GovernorConfig) -> Self {
        Self::new(config.latency_floor_s, config.latency_ceiling_s)
    }

    /// Controller-latency penalty: 0 below the floor, 1 above the
    /// ceiling, linear ramp between. Out-of-range input is clamped.
    pub fn latency_penalty(&self, latency_s: f64) -> f64 {
        if !latency_s.is_finite() {
            return 1.0;
        }
        ((latency_s - self.latency_floor_s) / (self.latency_ceiling_s - self.latency_floor_s))
            .clamp(0.0, 1.0)
    }

    /// Two-factor geometric-mean composite, fail-closed.
    pub fn compute_ris(&self, stability: f64, ethics: f64) -> f64 {
        if stability <= 0.0 || ethics <= 0.0 {
            return 0.0;
        }
        (stability * ethics).sqrt().clamp(0.0, 1.0)
    }

    /// Three-factor cube-root alternative including the latency
    /// penalty. Not used by the governor; kept for reconciliation
    /// with deployments that score controller latency.
    pub fn compute_ris_with_latency(
        &self,
        stability: f64,
        ethics: f64,
        latency_penalty: f64,
    ) -> f64 {
        let freshness = 1.0 - latency_penalty.clamp(0.0, 1.0);
        if stability <= 0.0 || ethics <= 0.0 || freshness <= 0.0 {
            return 0.0;
        }
        (stability * ethics * freshness).cbrt().clamp(0.0, 1.0)
    }
}

/// One provider in the ordered ethics fallback chain.
///
/// Returns `None` when this provider has no opinion, letting the next
/// one in the chain answer.
pub trait EthicsSource: Send + Sync {
    fn ethics(&self) -> Option<f64>;
}

/// Ethics provider backed by a compliance checklist.
pub struct ChecklistEthics {
    checks: Vec<EthicsCheck>,
}

impl ChecklistEthics {
    pub fn new(checks: Vec<EthicsCheck>) -> Self {
        Self { checks }
    }
}

impl EthicsSource for ChecklistEthics {
    fn ethics(&self) -> Option<f64> {
        Some(ethics_score(&self.checks))
    }
}

/// External ethics provider that calls a scoring function pointer.
///
/// Lets the surrounding service delegate to a live compliance
/// evaluator while the chain semantics stay in the core.
type EthicsFn = Box<dyn Fn() -> Option<f64> + Send + Sync>;

pub struct ExternalEthics {
    source_fn: EthicsFn,
}

impl ExternalEthics {
    pub fn new(source_fn: impl Fn() -> Option<f64> + Send + Sync + 'static) -> Self {
        Self {
            source_fn: Box::new(source_fn),
        }
    }
}

impl EthicsSource for ExternalEthics {
    fn ethics(&self) -> Option<f64> {
        (self.source_fn)()
    }
}

/// Ordered ethics fallback chain: providers are tried in sequence and
/// the first non-null answer wins; an empty or silent chain resolves
/// to neutral full compliance (1.0).
pub struct EthicsChain {
    providers: Vec<Arc<dyn EthicsSource>>,
}

impl EthicsChain {
    pub fn new(providers: Vec<Arc<dyn EthicsSource>>) -> Self {
        Self { providers }
    }

    /// No providers configured: always neutral.
    pub fn neutral() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn resolve(&self) -> f64 {
        for provider in &self.providers {
            if let Some(score) = provider.ethics() {
                return score.clamp(0.0, 1.0);
            }
        }
        1.0
    }
}
