// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Federation Peer Store
// ─────────────────────────────────────────────────────────────────────
//! Rolling store of per-peer reported metrics with a liveness query.
//!
//! Upserts come from an independently scheduled HTTP poller; reads
//! come from the governance evaluator. The map is sharded
//! (`DashMap`), so peer upserts for different ids never contend and
//! readers never lock out writers for the whole store. Last-write-wins
//! is defined per id only.
//!
//! Staleness is lazy: liveness queries filter on `last_seen`, but
//! stale records are never purged, so last-known peer values remain
//! inspectable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use wisdom_types::signal::PeerRecord;

use crate::clock::Clock;

pub struct PeerStore {
    records: DashMap<String, PeerRecord>,
    clock: Arc<dyn Clock>,
    clamped_metrics: AtomicU64,
}

impl PeerStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
            clamped_metrics: AtomicU64::new(0),
        }
    }

    /// Replace the record for `peer_id` wholesale.
    ///
    /// `last_seen` is stamped with the receipt time, ignoring whatever
    /// the peer claimed, to resist peer clock skew. Out-of-range
    /// metrics are clamped and counted, never rejected.
    pub fn upsert(
        &self,
        peer_id: &str,
        generativity: f64,
        quality: f64,
        success_rate: f64,
        latency_s: f64,
    ) {
        let (mut record, clamped) =
            PeerRecord::sanitized(peer_id, generativity, quality, success_rate, latency_s);
        if clamped > 0 {
            log::warn!("peer store: {clamped} metric(s) clamped for peer {peer_id}");
            self.clamped_metrics.fetch_add(clamped, Ordering::Relaxed);
        }
        record.last_seen_s = self.clock.now_s();
        self.records.insert(record.peer_id.clone(), record);
    }

    /// Peers whose `last_seen` is within `max_age_s` of now.
    pub fn get_live_peers(&self, max_age_s: f64) -> Vec<PeerRecord> {
        let now = self.clock.now_s();
        self.records
            .iter()
            .filter(|entry| now - entry.value().last_seen_s <= max_age_s)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Convenience count over `get_live_peers`.
    pub fn get_peer_count(&self, max_age_s: f64) -> usize {
        let now = self.clock.now_s();
        self.records
            .iter()
            .filter(|entry| now - entry.value().last_seen_s <= max_age_s)
            .count()
    }

    /// Total records including stale ones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Metrics that arrived out of range and were clamped.
    pub fn clamped_metrics(&self) -> u64 {
        self.clamped_metrics.load(Ordering::Relaxed)
    }
}
