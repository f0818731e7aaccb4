// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor Signal Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to the nearest
/// bound. Input anomalies are clamped, never rejected — this is a
/// monitoring signal, not a safety-critical command.
#[inline]
pub fn clamp_unit(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_unit: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_unit: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// A single timestamped coherence observation from the temporal engine.
///
/// Immutable once created; stored only inside the resonance window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceSample {
    /// Monotonic timestamp in seconds.
    pub timestamp_s: f64,
    /// Coherence value in [0, 1].
    pub value: f64,
    /// Origin of the sample (e.g. "trsi", "replay").
    pub source_tag: String,
}

/// Derived statistics over the resonance window. Computed on read,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowStats {
    pub count: usize,
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    /// clamp(mean - stdev, 0, 1); neutral 0.5 on cold start.
    pub stability: f64,
    pub trend_24h: f64,
    pub window_start_s: f64,
    pub window_end_s: f64,
    /// Samples that arrived out of range or out of order and were
    /// clamped rather than rejected.
    pub clamped_inputs: u64,
}

/// Per-peer metrics as reported over the federation protocol.
///
/// `last_seen_s` is stamped with receipt time at upsert, not with the
/// peer-claimed time, to resist peer clock skew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    pub peer_id: String,
    pub last_seen_s: f64,
    pub generativity: f64,
    pub quality: f64,
    pub success_rate: f64,
    pub latency_s: f64,
}

impl PeerRecord {
    /// Build a record with all bounded metrics clamped into range.
    /// Returns the record plus the number of fields that needed
    /// clamping (fed into the store's anomaly counter).
    pub fn sanitized(
        peer_id: impl Into<String>,
        generativity: f64,
        quality: f64,
        success_rate: f64,
        latency_s: f64,
    ) -> (Self, u64) {
        let mut clamped = 0;
        let mut bound = |v: f64, lo: f64, hi: f64| {
            let c = clamp_unit(v, lo, hi);
            if c != v || !v.is_finite() {
                clamped += 1;
            }
            c
        };
        let record = Self {
            peer_id: peer_id.into(),
            last_seen_s: 0.0,
            generativity: bound(generativity, 0.0, 1.0),
            quality: bound(quality, 0.0, 1.0),
            success_rate: bound(success_rate, 0.0, 1.0),
            latency_s: bound(latency_s, 0.0, f64::MAX),
        };
        (record, clamped)
    }
}

/// One compliance check result from the external ethics evaluator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EthicsCheck {
    pub passed: bool,
}
