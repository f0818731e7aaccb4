// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Wisdom Governor Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Self-stabilizing governance loop for the wisdom subsystem:
//! rolling coherence memory, composite integrity scoring, peer-driven
//! novelty, and the hysteretic control loop that turns those signals
//! into an operating mode and an adapted learning rate.
//!
//! # Safety Invariants
//!
//! 1. **CRITICAL dominates**: the mode table is evaluated in a fixed
//!    nested order with the critical-margin check first. No
//!    generativity score, however high, can route around it.
//!
//! 2. **Missing inputs never stop the tick**: an empty window, an
//!    empty peer store, or an absent ethics feed substitute the
//!    documented neutral defaults (0.5 stability, 1.0 ethics,
//!    0 novelty). Only a post-clamp invariant violation (non-finite
//!    or negative eta) halts the process, because silently continuing
//!    risks reporting a false "safe" state.
//!
//! 3. **Snapshots are replaced, never patched**: `evaluate()` builds
//!    a fresh `GovernorState` and swaps the published `Arc`
//!    wholesale. Readers never observe a half-updated state and never
//!    synchronize.
//!
//! 4. **No I/O in the critical section**: `evaluate()` only reads
//!    what the sampler and poller already pushed into the stores.
//!    The evaluator never waits on a peer round-trip.

pub mod clock;
pub mod context;
pub mod governor;
pub mod peers;
pub mod resonance;
pub mod ris;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::GenerativityContext;
pub use governor::{DerivedMargin, ExternalMargin, MarginSource, WisdomGovernor};
pub use peers::PeerStore;
pub use resonance::ResonanceWindow;
pub use ris::{ChecklistEthics, EthicsChain, EthicsSource, ExternalEthics, IntegrityScorer};
