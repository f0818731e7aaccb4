// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Resonance Window (Rolling Coherence Memory)
// ─────────────────────────────────────────────────────────────────────
//! Fixed-capacity rolling store of timestamped coherence samples.
//!
//! Fed by the external temporal engine once per tick; read by the
//! governor on every evaluation. Mutation and read both take the same
//! exclusive lock — window operations are O(window size) and
//! sub-millisecond, so a single mutex is the intended discipline.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use wisdom_types::signal::{clamp_unit, CoherenceSample, WindowStats};

/// Neutral stability reported before the window has a one-day
/// baseline. Downstream thresholds assume this exact value.
const COLD_START_STABILITY: f64 = 0.5;

/// Bounded, timestamp-ordered coherence sample store.
pub struct ResonanceWindow {
    capacity: usize,
    min_samples: usize,
    samples: Mutex<VecDeque<CoherenceSample>>,
    clamped_inputs: AtomicU64,
}

impl ResonanceWindow {
    /// `capacity` is the window length in samples (one per hour);
    /// `min_samples` is the cold-start threshold below which
    /// `stability` reports neutral.
    pub fn new(capacity: usize, min_samples: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            min_samples,
            samples: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
            clamped_inputs: AtomicU64::new(0),
        }
    }

    /// Append a sample, evicting the oldest if at capacity.
    ///
    /// Out-of-range values are clamped into [0, 1] and out-of-order
    /// timestamps are clamped to the newest retained stamp; both are
    /// counted, neither is rejected.
    pub fn add_sample(&self, value: f64, timestamp_s: f64, source_tag: &str) {
        let clamped_value = clamp_unit(value, 0.0, 1.0);
        if clamped_value != value || !value.is_finite() {
            self.clamped_inputs.fetch_add(1, Ordering::Relaxed);
        }

        let mut samples = self.samples.lock();

        let mut ts = if timestamp_s.is_finite() { timestamp_s } else { 0.0 };
        if let Some(newest) = samples.back() {
            if ts < newest.timestamp_s {
                log::warn!(
                    "resonance window: out-of-order sample ({ts:.3} < {:.3}), clamping",
                    newest.timestamp_s
                );
                self.clamped_inputs.fetch_add(1, Ordering::Relaxed);
                ts = newest.timestamp_s;
            }
        }

        samples.push_back(CoherenceSample {
            timestamp_s: ts,
            value: clamped_value,
            source_tag: source_tag.to_string(),
        });
        if samples.len() > self.capacity {
            samples.pop_front();
        }
    }

    /// Derived statistics over the current window. Pure read.
    pub fn stats(&self) -> WindowStats {
        let samples = self.samples.lock();
        let count = samples.len();

        if count == 0 {
            return WindowStats {
                count: 0,
                mean: 0.0,
                stdev: 0.0,
                min: 0.0,
                max: 0.0,
                stability: COLD_START_STABILITY,
                trend_24h: 0.0,
                window_start_s: 0.0,
                window_end_s: 0.0,
                clamped_inputs: self.clamped_inputs.load(Ordering::Relaxed),
            };
        }

        let n = count as f64;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for s in samples.iter() {
            sum += s.value;
            min = min.min(s.value);
            max = max.max(s.value);
        }
        let mean = sum / n;
        let var = samples
            .iter()
            .map(|s| (s.value - mean).powi(2))
            .sum::<f64>()
            / n;
        let stdev = var.sqrt();

        let stability = if count < self.min_samples {
            COLD_START_STABILITY
        } else {
            (mean - stdev).clamp(0.0, 1.0)
        };

        WindowStats {
            count,
            mean,
            stdev,
            min,
            max,
            stability,
            trend_24h: Self::trend_locked(&samples, 24.0),
            window_start_s: samples.front().map(|s| s.timestamp_s).unwrap_or(0.0),
            window_end_s: samples.back().map(|s| s.timestamp_s).unwrap_or(0.0),
            clamped_inputs: self.clamped_inputs.load(Ordering::Relaxed),
        }
    }

    /// Difference between the newest and the oldest sample within the
    /// trailing `hours` window; 0.0 with fewer than two qualifying
    /// samples.
    pub fn trend(&self, hours: f64) -> f64 {
        Self::trend_locked(&self.samples.lock(), hours)
    }

    fn trend_locked(samples: &VecDeque<CoherenceSample>, hours: f64) -> f64 {
        let newest = match samples.back() {
            Some(s) => s,
            None => return 0.0,
        };
        let horizon = newest.timestamp_s - hours * 3600.0;
        let oldest_in_window = samples.iter().find(|s| s.timestamp_s >= horizon);
        match oldest_in_window {
            // Two distinct qualifying samples are required.
            Some(oldest) if !std::ptr::eq(oldest, newest) => newest.value - oldest.value,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
