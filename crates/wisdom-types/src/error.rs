// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Wisdom Governor failures.
#[derive(Error, Debug)]
pub enum WisdomError {
    /// Configuration rejected at startup (ill-defined control law).
    #[error("config error: {0}")]
    Config(String),

    /// Internal invariant violated — logic bug, not a data problem.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Numerical error (NaN/Inf where a finite scalar is required).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Malformed peer report that could not be salvaged by clamping.
    #[error("peer error: {0}")]
    Peer(String),

    /// Coherence signal feed failure.
    #[error("signal error: {0}")]
    Signal(String),
}

pub type WisdomResult<T> = Result<T, WisdomError>;
