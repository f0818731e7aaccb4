// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Generativity Context (Federation Hysteresis)
// ─────────────────────────────────────────────────────────────────────
//! Derives the novelty term from peer diversity and decides, under
//! hysteresis, whether the node is operating solo or federated.
//!
//! Transitions are debounced, not instantaneous: a candidate
//! transition condition starts a timer, and the transition commits
//! only once the condition has held continuously for the hysteresis
//! interval. If the condition reverts first, the timer resets. A
//! single flaky peer heartbeat can therefore never toggle the
//! generativity ceiling.

use std::sync::Arc;

use wisdom_types::signal::PeerRecord;
use wisdom_types::{FederationMode, GovernorConfig};

use crate::clock::Clock;

pub struct GenerativityContext {
    mode: FederationMode,
    /// When the pending transition condition first became true.
    pending_since_s: Option<f64>,
    last_transition_s: f64,
    min_peers: usize,
    hysteresis_interval_s: f64,
    g0_solo: f64,
    g0_federated: f64,
    clock: Arc<dyn Clock>,
}

impl GenerativityContext {
    pub fn new(config: &GovernorConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_s();
        Self {
            mode: FederationMode::Solo,
            pending_since_s: None,
            last_transition_s: now,
            min_peers: config.min_peers,
            hysteresis_interval_s: config.hysteresis_interval_s,
            g0_solo: config.g0_solo,
            g0_federated: config.g0_federated,
            clock,
        }
    }

    /// Feed the current live peer count; called once per governance
    /// tick. May commit a debounced mode flip.
    pub fn observe(&mut self, live_peer_count: usize) {
        let wants_flip = match self.mode {
            FederationMode::Solo => live_peer_count >= self.min_peers,
            FederationMode::Federated => live_peer_count < self.min_peers,
        };

        if !wants_flip {
            self.pending_since_s = None;
            return;
        }

        let now = self.clock.now_s();
        let since = *self.pending_since_s.get_or_insert(now);
        if now - since >= self.hysteresis_interval_s {
            self.mode = match self.mode {
                FederationMode::Solo => FederationMode::Federated,
                FederationMode::Federated => FederationMode::Solo,
            };
            log::info!(
                "generativity context: mode -> {:?} (peers={live_peer_count}, held {:.0}s)",
                self.mode,
                now - since
            );
            self.last_transition_s = now;
            self.pending_since_s = None;
        }
    }

    /// Baseline generativity for the current (already-debounced) mode.
    pub fn current_g0(&self) -> f64 {
        match self.mode {
            FederationMode::Solo => self.g0_solo,
            FederationMode::Federated => self.g0_federated,
        }
    }

    pub fn mode(&self) -> FederationMode {
        self.mode
    }

    pub fn last_transition_s(&self) -> f64 {
        self.last_transition_s
    }

    /// Novelty is the dispersion (population stdev) of peer-reported
    /// generativity. With fewer than two peers it is 0: diversity
    /// requires at least two independent viewpoints.
    pub fn compute_novelty(peers: &[PeerRecord]) -> f64 {
        if peers.len() < 2 {
            return 0.0;
        }
        let n = peers.len() as f64;
        let mean = peers.iter().map(|p| p.generativity).sum::<f64>() / n;
        let var = peers
            .iter()
            .map(|p| (p.generativity - mean).powi(2))
            .sum::<f64>()
            / n;
        var.sqrt()
    }
}
