// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Adaptive Wisdom Governor (Control Loop)
// ─────────────────────────────────────────────────────────────────────
//! The hysteretic governance control loop.
//!
//! Each `evaluate()` tick reads the resonance window, resolves the
//! ethics chain, polls the peer store, and turns the resulting
//! signals into an operating mode, an adapted learning rate, and a
//! backpressure recommendation, published as an immutable snapshot.
//!
//! Mode selection is a fixed nested priority chain, not independent
//! OR-conditions: CRITICAL first (safety overrides everything), then
//! STABILIZING, then the generativity-gated pair where OPTIMAL's
//! stricter threshold is examined only after EXPLORING's looser gate
//! already passed, with SAFE as the fallback. Flipping this order
//! changes mode assignments near threshold boundaries.
//!
//! The learning rate follows a proportional-derivative law. There is
//! no integral term: a brief stability dip must not wind up
//! long-memory error.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use wisdom_types::state::GComponents;
use wisdom_types::{GovernorConfig, GovernorState, Mode, WisdomResult};

use crate::clock::Clock;
use crate::context::GenerativityContext;
use crate::peers::PeerStore;
use crate::resonance::ResonanceWindow;
use crate::ris::{EthicsChain, IntegrityScorer};

/// Stability-margin estimator.
///
/// The margin is conceptually the distance from a bifurcation of the
/// controlled system; any bounded scalar with the same ordering
/// semantics qualifies. Production deployments plug an external
/// estimator in here; the bundled fallback derives a margin from
/// window stability.
pub trait MarginSource: Send + Sync {
    fn margin(&self, stability: f64) -> f64;
}

/// Fallback margin derived from window stability: `stability - offset`.
/// With the default offset, neutral cold-start stability (0.5) lands
/// exactly on the default target margin, so an unfed governor rests
/// at its default learning rate.
pub struct DerivedMargin {
    offset: f64,
}

impl DerivedMargin {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }
}

impl Default for DerivedMargin {
    fn default() -> Self {
        Self { offset: 0.25 }
    }
}

impl MarginSource for DerivedMargin {
    fn margin(&self, stability: f64) -> f64 {
        stability - self.offset
    }
}

/// External margin estimator that calls a function pointer.
type MarginFn = Box<dyn Fn(f64) -> f64 + Send + Sync>;

pub struct ExternalMargin {
    margin_fn: MarginFn,
}

impl ExternalMargin {
    pub fn new(margin_fn: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            margin_fn: Box::new(margin_fn),
        }
    }
}

impl MarginSource for ExternalMargin {
    fn margin(&self, stability: f64) -> f64 {
        (self.margin_fn)(stability)
    }
}

/// Controller state owned exclusively by the evaluate step.
struct GovernorInner {
    context: GenerativityContext,
    eta: f64,
    last_error: Option<f64>,
    last_eval_s: Option<f64>,
    tick: u64,
}

/// The governance control loop.
///
/// Holds references to the stores fed by the external sampler and
/// poller; `evaluate()` itself performs no I/O and never waits on a
/// peer round-trip.
pub struct WisdomGovernor {
    config: GovernorConfig,
    window: Arc<ResonanceWindow>,
    peers: Arc<PeerStore>,
    ethics: EthicsChain,
    margin_source: Arc<dyn MarginSource>,
    scorer: IntegrityScorer,
    clock: Arc<dyn Clock>,
    inner: Mutex<GovernorInner>,
    published: RwLock<Arc<GovernorState>>,
}

impl WisdomGovernor {
    /// Construct the governor, failing fast on an ill-defined
    /// configuration.
    pub fn new(
        config: GovernorConfig,
        window: Arc<ResonanceWindow>,
        peers: Arc<PeerStore>,
        ethics: EthicsChain,
        margin_source: Arc<dyn MarginSource>,
        clock: Arc<dyn Clock>,
    ) -> WisdomResult<Self> {
        config.validate()?;
        let context = GenerativityContext::new(&config, clock.clone());
        let startup = Arc::new(GovernorState::startup(config.eta_default));
        Ok(Self {
            scorer: IntegrityScorer::from_config(&config),
            inner: Mutex::new(GovernorInner {
                context,
                eta: config.eta_default,
                last_error: None,
                last_eval_s: None,
                tick: 0,
            }),
            published: RwLock::new(startup),
            config,
            window,
            peers,
            ethics,
            margin_source,
            clock,
        })
    }

    /// Run one governance tick and publish the resulting snapshot.
    ///
    /// Missing optional inputs substitute the documented neutral
    /// defaults; the tick never stops for a data gap. A non-finite or
    /// negative learning rate after clamping indicates a logic bug
    /// and halts the process.
    pub fn evaluate(&self) -> Arc<GovernorState> {
        let cfg = &self.config;
        let now = self.clock.now_s();

        // Local coherence. An empty or cold window already reports
        // neutral stability 0.5.
        let stats = self.window.stats();
        let cold_window = stats.count < cfg.min_samples_for_stability;

        // Integrity: the ethics chain resolves to 1.0 when silent.
        let ethics = self.ethics.resolve();
        let ris = self.scorer.compute_ris(stats.stability, ethics);

        // Federation signals. Zero live peers means zero novelty.
        let live = self.peers.get_live_peers(cfg.peer_max_age_s);
        let novelty = GenerativityContext::compute_novelty(&live);

        let s = self.margin_source.margin(stats.stability);

        let previous_mode = self.published.read().mode;

        let state = {
            let mut inner = self.inner.lock();
            inner.context.observe(live.len());
            let federation = inner.context.mode();
            let g0 = inner.context.current_g0();

            // G* components. A cold window contributes neutral
            // consistency rather than pretending perfect agreement.
            let progress = (g0 + stats.trend_24h.max(0.0)).clamp(0.0, 1.0);
            let consistency = if cold_window {
                0.5
            } else {
                (1.0 - stats.stdev).clamp(0.0, 1.0)
            };
            let g_star = cfg.w_progress * progress
                + cfg.w_novelty * novelty
                + cfg.w_consistency * consistency;

            // Mode selection: fixed nested priority order.
            let mode = if s < cfg.critical_margin {
                Mode::Critical
            } else if s < cfg.stabilizing_margin {
                Mode::Stabilizing
            } else if g_star >= cfg.exploring_g_threshold {
                if g_star >= cfg.optimal_g_threshold {
                    Mode::Optimal
                } else {
                    Mode::Exploring
                }
            } else {
                Mode::Safe
            };

            // PD learning-rate law, then per-mode shaping.
            let error = cfg.target_margin - s;
            let derivative = match (inner.last_error, inner.last_eval_s) {
                (Some(last_e), Some(last_t)) if now > last_t => (error - last_e) / (now - last_t),
                _ => 0.0,
            };
            let gamma = cfg.k_d * derivative;
            let eta_pd = cfg.eta_default + cfg.k_p * error + gamma;

            let eta = match mode {
                Mode::Critical => inner.eta,
                Mode::Stabilizing => lerp(eta_pd, cfg.eta_min, cfg.eta_pull),
                Mode::Exploring => lerp(eta_pd, cfg.eta_max, cfg.eta_pull),
                Mode::Optimal => lerp(eta_pd, cfg.eta_default, cfg.eta_pull),
                Mode::Safe => cfg.eta_default,
            }
            .clamp(cfg.eta_min, cfg.eta_max);

            // Invariant: the clamp bounds are validated positive, so a
            // non-finite or non-positive eta here is a logic bug. A
            // governor reporting a false "safe" state is worse than a
            // crash.
            assert!(
                eta.is_finite() && eta > 0.0,
                "wisdom governor invariant violated: eta = {eta} after clamping"
            );

            inner.eta = eta;
            inner.last_error = Some(error);
            inner.last_eval_s = Some(now);
            inner.tick += 1;

            GovernorState {
                s,
                h: stats.stdev,
                gamma,
                eta,
                ris,
                frozen: mode == Mode::Critical,
                mode,
                backpressure: mode.backpressure(),
                g_star,
                g_components: GComponents {
                    progress,
                    novelty,
                    consistency,
                },
                federation,
                live_peers: live.len(),
                tick: inner.tick,
                evaluated_at_s: now,
            }
        };

        // Side effects happen on the finished snapshot, outside the
        // controller lock.
        if state.mode != previous_mode {
            if state.mode == Mode::Critical {
                log::error!(
                    ">>> WISDOM GOVERNOR CRITICAL: S={:.4} < {:.4}, learning frozen <<<",
                    state.s,
                    cfg.critical_margin
                );
            } else {
                log::info!(
                    "wisdom governor: mode {previous_mode:?} -> {:?} (S={:.4}, G*={:.4})",
                    state.mode,
                    state.s,
                    state.g_star
                );
            }
        }

        let shared = Arc::new(state);
        *self.published.write() = shared.clone();
        shared
    }

    /// Latest published snapshot. Cheap; callers may hold the `Arc`
    /// indefinitely without blocking the evaluator.
    pub fn snapshot(&self) -> Arc<GovernorState> {
        self.published.read().clone()
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ris::ExternalEthics;

    const HOUR: f64 = 3600.0;

    struct Fixture {
        clock: Arc<ManualClock>,
        window: Arc<ResonanceWindow>,
        peers: Arc<PeerStore>,
        governor: WisdomGovernor,
    }

    fn fixture(config: GovernorConfig, margin: Arc<dyn MarginSource>) -> Fixture {
        let clock = Arc::new(ManualClock::new(0.0));
        let window = Arc::new(ResonanceWindow::new(
            config.window_hours,
            config.min_samples_for_stability,
        ));
        let peers = Arc::new(PeerStore::new(clock.clone()));
        let governor = WisdomGovernor::new(
            config,
            window.clone(),
            peers.clone(),
            EthicsChain::neutral(),
            margin,
            clock.clone(),
        )
        .expect("valid config");
        Fixture {
            clock,
            window,
            peers,
            governor,
        }
    }

    fn default_fixture() -> Fixture {
        fixture(
            GovernorConfig::default(),
            Arc::new(DerivedMargin::default()),
        )
    }

    fn fixed_margin(s: f64) -> Arc<dyn MarginSource> {
        Arc::new(ExternalMargin::new(move |_| s))
    }

    fn seed_hourly(fix: &Fixture, values: &[f64]) {
        for (i, &v) in values.iter().enumerate() {
            fix.window.add_sample(v, i as f64 * HOUR, "trsi");
        }
    }

    // ── Mode priority ─────────────────────────────────────────────

    #[test]
    fn test_critical_dominates_any_generativity() {
        let cfg = GovernorConfig::default();
        let fix = fixture(cfg.clone(), fixed_margin(cfg.critical_margin - 1e-6));
        // Maximize G*: steady window (consistency 1) plus diverse
        // federated-grade peers.
        seed_hourly(&fix, &[0.9; 168]);
        fix.peers.upsert("a", 0.1, 0.9, 1.0, 0.1);
        fix.peers.upsert("b", 0.9, 0.9, 1.0, 0.1);

        let state = fix.governor.evaluate();
        assert_eq!(state.mode, Mode::Critical);
        assert!(state.frozen);
        assert!(state.backpressure);
    }

    #[test]
    fn test_critical_leaves_eta_unchanged() {
        let cfg = GovernorConfig::default();
        let fix = fixture(cfg.clone(), fixed_margin(cfg.critical_margin - 0.01));
        seed_hourly(&fix, &[0.85; 48]);
        // eta stays at its previous value (the startup default) for as
        // long as the freeze holds, even though the PD error is large.
        for i in 0..5 {
            fix.clock.set(i as f64 * 15.0);
            let state = fix.governor.evaluate();
            assert_eq!(state.mode, Mode::Critical);
            assert!((state.eta - cfg.eta_default).abs() < 1e-12);
        }
    }

    #[test]
    fn test_stabilizing_band_pulls_eta_down() {
        let mut cfg = GovernorConfig::default();
        cfg.eta_pull = 1.0; // full pull: mode target wins outright
        let fix = fixture(cfg.clone(), fixed_margin(0.10));
        seed_hourly(&fix, &[0.85; 48]);
        let state = fix.governor.evaluate();
        assert_eq!(state.mode, Mode::Stabilizing);
        assert!(!state.frozen);
        assert!(state.backpressure);
        assert!((state.eta - cfg.eta_min).abs() < 1e-12);
    }

    #[test]
    fn test_safe_fallback_when_generativity_low() {
        let mut cfg = GovernorConfig::default();
        cfg.exploring_g_threshold = 0.60;
        cfg.optimal_g_threshold = 0.80;
        let fix = fixture(cfg.clone(), fixed_margin(0.30));
        seed_hourly(&fix, &[0.85; 48]);
        // Solo, no peers: G* = 0.4*0.3 + 0.3*0 + 0.3*1.0 = 0.42 < 0.60.
        let state = fix.governor.evaluate();
        assert_eq!(state.mode, Mode::Safe);
        assert!(!state.backpressure);
        assert!((state.eta - cfg.eta_default).abs() < 1e-12);
    }

    #[test]
    fn test_exploring_gate() {
        let cfg = GovernorConfig::default();
        let fix = fixture(cfg.clone(), fixed_margin(0.30));
        seed_hourly(&fix, &[0.85; 48]);
        // Solo, steady window: G* = 0.42, between 0.40 and 0.70.
        let state = fix.governor.evaluate();
        assert_eq!(state.mode, Mode::Exploring);
        assert!(!state.backpressure);
        assert!(state.eta > cfg.eta_default);
    }

    #[test]
    fn test_optimal_requires_stricter_threshold() {
        let mut cfg = GovernorConfig::default();
        cfg.optimal_g_threshold = 0.60;
        let fix = fixture(cfg.clone(), fixed_margin(0.30));
        seed_hourly(&fix, &[0.85; 168]);
        fix.peers.upsert("a", 0.1, 0.9, 1.0, 0.1);
        fix.peers.upsert("b", 0.9, 0.9, 1.0, 0.1);

        // Drive the context through federation hysteresis.
        let mut state = fix.governor.evaluate();
        for i in 1..=10 {
            fix.clock.set(i as f64 * 15.0);
            fix.peers.upsert("a", 0.1, 0.9, 1.0, 0.1);
            fix.peers.upsert("b", 0.9, 0.9, 1.0, 0.1);
            state = fix.governor.evaluate();
        }
        // Federated: G* = 0.4*0.6 + 0.3*0.4 + 0.3*1.0 = 0.66 >= 0.60.
        assert_eq!(state.federation, wisdom_types::FederationMode::Federated);
        assert_eq!(state.mode, Mode::Optimal);
        assert!((state.g_star - 0.66).abs() < 1e-9);
    }

    // ── Learning-rate law ─────────────────────────────────────────

    #[test]
    fn test_eta_clamped_under_saturation() {
        let cfg = GovernorConfig::default();
        // Huge margin -> hugely negative PD error -> eta_pd far below
        // eta_min; the clamp must hold.
        let fix = fixture(cfg.clone(), fixed_margin(50.0));
        seed_hourly(&fix, &[0.85; 48]);
        for i in 0..20 {
            fix.clock.set(i as f64 * 15.0);
            let state = fix.governor.evaluate();
            assert!(state.eta >= cfg.eta_min && state.eta <= cfg.eta_max);
        }
    }

    #[test]
    fn test_derivative_term_reported_as_gamma() {
        let cfg = GovernorConfig::default();
        let fix = fixture(cfg.clone(), fixed_margin(0.10));
        seed_hourly(&fix, &[0.85; 48]);
        let first = fix.governor.evaluate();
        assert_eq!(first.gamma, 0.0); // no previous error yet
        fix.clock.set(15.0);
        let second = fix.governor.evaluate();
        // Constant margin -> constant error -> zero derivative.
        assert!(second.gamma.abs() < 1e-12);
    }

    // ── Neutral defaults / starvation ─────────────────────────────

    #[test]
    fn test_empty_inputs_keep_ticking() {
        let fix = default_fixture();
        let state = fix.governor.evaluate();
        // Neutral stability 0.5 - 0.25 offset = target margin: at rest.
        assert_eq!(state.mode, Mode::Safe);
        assert!(!state.frozen);
        assert_eq!(state.g_components.novelty, 0.0);
        assert!((state.g_components.consistency - 0.5).abs() < 1e-12);
        assert!((state.eta - fix.governor.config().eta_default).abs() < 1e-12);
        assert_eq!(state.live_peers, 0);
    }

    #[test]
    fn test_snapshot_replaced_wholesale() {
        let fix = default_fixture();
        let first = fix.governor.evaluate();
        let held = fix.governor.snapshot();
        fix.clock.set(15.0);
        let second = fix.governor.evaluate();
        assert_eq!(held.tick, first.tick);
        assert_eq!(second.tick, first.tick + 1);
        // The old Arc is untouched by the new publication.
        assert_eq!(held.tick + 1, fix.governor.snapshot().tick);
    }

    #[test]
    fn test_published_snapshot_serializes_for_attestation() {
        let fix = default_fixture();
        seed_hourly(&fix, &[0.85; 48]);
        let state = fix.governor.evaluate();
        // The attestation writer hashes the JSON form of the snapshot;
        // every published field must survive the round trip.
        let json = serde_json::to_string(&*state).unwrap();
        let back: GovernorState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode, state.mode);
        assert_eq!(back.tick, state.tick);
        assert!((back.eta - state.eta).abs() < 1e-15);
        assert!((back.g_star - state.g_star).abs() < 1e-15);
        assert_eq!(back.live_peers, state.live_peers);
    }

    #[test]
    fn test_startup_snapshot_is_safe_before_first_tick() {
        let fix = default_fixture();
        let state = fix.governor.snapshot();
        assert_eq!(state.mode, Mode::Safe);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut cfg = GovernorConfig::default();
        cfg.eta_min = 0.5;
        cfg.eta_max = 0.1;
        let clock = Arc::new(ManualClock::new(0.0));
        let window = Arc::new(ResonanceWindow::new(168, 24));
        let peers = Arc::new(PeerStore::new(clock.clone()));
        let result = WisdomGovernor::new(
            cfg,
            window,
            peers,
            EthicsChain::neutral(),
            Arc::new(DerivedMargin::default()),
            clock,
        );
        assert!(result.is_err());
    }

    // ── RIS integration ───────────────────────────────────────────

    #[test]
    fn test_ris_uses_window_stability_and_ethics() {
        let cfg = GovernorConfig::default();
        let clock = Arc::new(ManualClock::new(0.0));
        let window = Arc::new(ResonanceWindow::new(168, 24));
        let peers = Arc::new(PeerStore::new(clock.clone()));
        let ethics = EthicsChain::new(vec![Arc::new(ExternalEthics::new(|| Some(0.5)))]);
        let governor = WisdomGovernor::new(
            cfg,
            window.clone(),
            peers,
            ethics,
            Arc::new(DerivedMargin::default()),
            clock,
        )
        .unwrap();
        for i in 0..48 {
            window.add_sample(0.8, i as f64 * HOUR, "trsi");
        }
        let state = governor.evaluate();
        assert!((state.ris - (0.8_f64 * 0.5).sqrt()).abs() < 1e-9);
    }

    // ── End-to-end scenario ───────────────────────────────────────

    #[test]
    fn test_seeded_window_scenario_and_stress_recovery() {
        let fix = default_fixture();
        seed_hourly(&fix, &[0.85; 168]);

        let baseline = fix.governor.evaluate();
        assert!((baseline.s - 0.60).abs() < 1e-9); // 0.85 - 0.25 offset
        let stats = fix.window.stats();
        assert!((stats.stability - 0.85).abs() < 1e-9);
        assert!((baseline.ris - 0.85_f64.sqrt()).abs() < 1e-9);
        assert_eq!(baseline.g_components.novelty, 0.0);
        assert!(!baseline.backpressure);

        // Sustained +0.1 drift for 10 ticks.
        let mut t = 168.0;
        for _ in 0..10 {
            fix.window.add_sample(0.95, t * HOUR, "trsi");
            t += 1.0;
            fix.clock.set(t * HOUR);
            fix.governor.evaluate();
        }

        // 24 ticks of unperturbed input: stability returns to within
        // 90% of baseline.
        for _ in 0..24 {
            fix.window.add_sample(0.85, t * HOUR, "trsi");
            t += 1.0;
            fix.clock.set(t * HOUR);
            fix.governor.evaluate();
        }
        let recovered = fix.window.stats().stability;
        assert!(
            recovered >= 0.9 * 0.85,
            "stability {recovered} did not recover to 90% of baseline"
        );
    }
}
