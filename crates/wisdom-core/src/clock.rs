// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor Clock Seam
// ─────────────────────────────────────────────────────────────────────
//! Time source behind a trait so that staleness and hysteresis logic
//! stay deterministic under test. Production code uses `SystemClock`;
//! tests drive a `ManualClock`.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Time source, in seconds.
pub trait Clock: Send + Sync {
    fn now_s(&self) -> f64;
}

/// Wall-clock seconds since the Unix epoch.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_s(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Manually advanced clock for deterministic tests.
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start_s: f64) -> Self {
        Self {
            now: Mutex::new(start_s),
        }
    }

    pub fn set(&self, t_s: f64) {
        *self.now.lock() = t_s;
    }

    pub fn advance(&self, dt_s: f64) {
        *self.now.lock() += dt_s;
    }
}

impl Clock for ManualClock {
    fn now_s(&self) -> f64 {
        *self.now.lock()
    }
}
