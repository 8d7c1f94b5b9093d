//! Content-addressed, single-flight cache of analysis reports.
//!
//! Reports are keyed by the fingerprint of the tree and the fingerprint of
//! the options, so two trees with the same content share an entry no matter
//! where they came from.
//!
//! # Single-Flight
//!
//! When several callers ask for the same missing key at once, exactly one of
//! them (the leader) runs the computation. The others block on the key's
//! [`Flight`] and receive the leader's result, success or failure. The table
//! lock is only held for bookkeeping, never while computing, so unrelated
//! keys proceed in parallel.
//!
//! Failures are handed to every waiter and then forgotten: the next request
//! for the key computes again. A panic in the computation is caught and
//! delivered as [`AnalysisError::ComputationPanicked`].
//!
//! # Eviction
//!
//! Least-recently-used on insert, bounded by the capacity. A capacity of 0
//! stores nothing but still coalesces concurrent requests.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

use crate::analysis::{AnalysisOptions, AnalysisReport};
use crate::error::AnalysisError;
use crate::tree::{Fingerprint, StyleTree};

/// Identity of one analysis: what was analyzed and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Fingerprint of the tree content.
    pub tree: Fingerprint,
    /// Fingerprint of the option values.
    pub options: Fingerprint,
}

impl CacheKey {
    /// Computes the key for a tree and options pair.
    pub fn new(tree: &StyleTree, options: &AnalysisOptions) -> Self {
        Self {
            tree: tree.fingerprint(),
            options: options.fingerprint(),
        }
    }
}

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests answered from storage.
    pub hits: u64,
    /// Requests that ran the computation.
    pub misses: u64,
    /// Requests that waited on another caller's computation.
    pub coalesced: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
    /// Entries currently stored.
    pub entries: usize,
}

type Outcome = Result<Arc<AnalysisReport>, AnalysisError>;

/// A computation in progress for one key.
struct Flight {
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> Outcome {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.done.wait(&mut slot);
        }
    }

    fn complete(&self, outcome: Outcome) {
        *self.outcome.lock() = Some(outcome);
        self.done.notify_all();
    }
}

struct Entry {
    report: Arc<AnalysisReport>,
    last_used: u64,
}

#[derive(Default)]
struct State {
    entries: HashMap<CacheKey, Entry>,
    in_flight: HashMap<CacheKey, Arc<Flight>>,
    clock: u64,
    stats: CacheStats,
}

impl State {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| *key)
            else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            tracing::debug!(tree = %oldest.tree, "evicted analysis");
        }
    }
}

enum Role {
    Leader(Arc<Flight>),
    Follower(Arc<Flight>),
}

/// Thread-safe cache of analysis reports.
pub struct AnalysisCache {
    capacity: usize,
    state: Mutex<State>,
}

impl std::fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCache")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

impl AnalysisCache {
    /// Creates a cache holding at most `capacity` reports.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(State::default()),
        }
    }

    /// Maximum number of stored reports.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the stored report for `(tree, options)`, or computes it.
    ///
    /// Concurrent calls for the same key run `compute` once; every caller
    /// receives the same result.
    pub fn get_or_compute<F>(
        &self,
        tree: &StyleTree,
        options: &AnalysisOptions,
        compute: F,
    ) -> Result<Arc<AnalysisReport>, AnalysisError>
    where
        F: FnOnce() -> Result<AnalysisReport, AnalysisError>,
    {
        let key = CacheKey::new(tree, options);

        let role = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let now = state.tick();

            if let Some(entry) = state.entries.get_mut(&key) {
                entry.last_used = now;
                state.stats.hits += 1;
                tracing::debug!(tree = %key.tree, "analysis cache hit");
                return Ok(Arc::clone(&entry.report));
            }

            match state.in_flight.get(&key) {
                Some(flight) => {
                    state.stats.coalesced += 1;
                    tracing::debug!(tree = %key.tree, "joining in-flight analysis");
                    Role::Follower(Arc::clone(flight))
                }
                None => {
                    state.stats.misses += 1;
                    tracing::debug!(tree = %key.tree, "analysis cache miss");
                    let flight = Arc::new(Flight::new());
                    state.in_flight.insert(key, Arc::clone(&flight));
                    Role::Leader(flight)
                }
            }
        };

        match role {
            Role::Follower(flight) => flight.wait(),
            Role::Leader(flight) => {
                let outcome = match panic::catch_unwind(AssertUnwindSafe(compute)) {
                    Ok(result) => result.map(Arc::new),
                    Err(payload) => Err(AnalysisError::ComputationPanicked(panic_message(
                        payload.as_ref(),
                    ))),
                };
                self.finish(key, &flight, outcome.clone());
                outcome
            }
        }
    }

    fn finish(&self, key: CacheKey, flight: &Flight, outcome: Outcome) {
        {
            let mut state = self.state.lock();
            state.in_flight.remove(&key);
            match &outcome {
                Ok(report) if self.capacity > 0 => {
                    let last_used = state.tick();
                    state.entries.insert(
                        key,
                        Entry {
                            report: Arc::clone(report),
                            last_used,
                        },
                    );
                    state.evict_to(self.capacity);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(tree = %key.tree, code = err.code(), "analysis failed; not cached");
                }
            }
        }
        flight.complete(outcome);
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    /// Number of stored reports.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored report. Computations in flight are unaffected.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Capacity used by [`AnalysisCache::default`].
pub const DEFAULT_CAPACITY: usize = 64;

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StyleAnalyzer;
    use crate::tree::StyleNode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tree(color: &str) -> StyleTree {
        StyleTree::new().root(StyleNode::new(".x").declare("color", color))
    }

    fn analyze(tree: &StyleTree) -> Result<AnalysisReport, AnalysisError> {
        StyleAnalyzer::default().analyze(tree)
    }

    // =========================================================================
    // Hits and misses
    // =========================================================================

    #[test]
    fn test_second_request_hits() {
        let cache = AnalysisCache::new(4);
        let options = AnalysisOptions::default();
        let t = tree("red");
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            analyze(&t)
        };

        let first = cache.get_or_compute(&t, &options, compute).unwrap();
        let second = cache.get_or_compute(&t, &options, compute).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_equal_content_shares_entry() {
        let cache = AnalysisCache::new(4);
        let options = AnalysisOptions::default();
        let a = tree("red");
        let b = tree("red").with_source("elsewhere.yaml");
        cache.get_or_compute(&a, &options, || analyze(&a)).unwrap();
        cache.get_or_compute(&b, &options, || analyze(&b)).unwrap();
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_options_are_part_of_key() {
        let cache = AnalysisCache::new(4);
        let t = tree("red");
        let loose = AnalysisOptions::default();
        let strict = loose.to_builder().minimum_frequency(5).build().unwrap();
        cache.get_or_compute(&t, &loose, || analyze(&t)).unwrap();
        cache.get_or_compute(&t, &strict, || analyze(&t)).unwrap();
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.len(), 2);
    }

    // =========================================================================
    // Eviction
    // =========================================================================

    #[test]
    fn test_lru_eviction() {
        let cache = AnalysisCache::new(2);
        let options = AnalysisOptions::default();
        let (red, blue, green) = (tree("red"), tree("blue"), tree("green"));

        cache.get_or_compute(&red, &options, || analyze(&red)).unwrap();
        cache.get_or_compute(&blue, &options, || analyze(&blue)).unwrap();
        // Touch red so blue is the least recently used
        cache.get_or_compute(&red, &options, || analyze(&red)).unwrap();
        cache.get_or_compute(&green, &options, || analyze(&green)).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);

        let before = cache.stats().misses;
        cache.get_or_compute(&red, &options, || analyze(&red)).unwrap();
        assert_eq!(cache.stats().misses, before);
        cache.get_or_compute(&blue, &options, || analyze(&blue)).unwrap();
        assert_eq!(cache.stats().misses, before + 1);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = AnalysisCache::new(0);
        let options = AnalysisOptions::default();
        let t = tree("red");
        cache.get_or_compute(&t, &options, || analyze(&t)).unwrap();
        cache.get_or_compute(&t, &options, || analyze(&t)).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_clear() {
        let cache = AnalysisCache::default();
        let options = AnalysisOptions::default();
        let t = tree("red");
        cache.get_or_compute(&t, &options, || analyze(&t)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[test]
    fn test_failures_are_not_cached() {
        let cache = AnalysisCache::new(4);
        let options = AnalysisOptions::default();
        let t = tree("red");

        let err = cache
            .get_or_compute(&t, &options, || {
                Err(AnalysisError::ComputationPanicked("flaky".into()))
            })
            .unwrap_err();
        assert_eq!(err, AnalysisError::ComputationPanicked("flaky".into()));
        assert!(cache.is_empty());

        assert!(cache.get_or_compute(&t, &options, || analyze(&t)).is_ok());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_panic_becomes_error() {
        let cache = AnalysisCache::new(4);
        let options = AnalysisOptions::default();
        let t = tree("red");

        let err = cache
            .get_or_compute(&t, &options, || panic!("detector exploded"))
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ComputationPanicked("detector exploded".into())
        );

        // The key is free again
        assert!(cache.get_or_compute(&t, &options, || analyze(&t)).is_ok());
    }
}
