// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Wisdom Governor — the self-stabilizing governance loop of the
//! Director-Class AI wisdom subsystem.

pub mod config;
pub mod error;
pub mod signal;
pub mod state;

pub use config::GovernorConfig;
pub use error::{WisdomError, WisdomResult};
pub use signal::{clamp_unit, CoherenceSample, EthicsCheck, PeerRecord, WindowStats};
pub use state::{FederationMode, GComponents, GovernorState, Mode};
