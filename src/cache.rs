//! Counter-keyed memoization of prediction records.
//!
//! Keying by counter alone is only correct because outcomes are pure given
//! the counter and the domain. Anything that changes the domain or the
//! outcome semantics must invalidate the whole cache.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, trace};

/// The simulated outcome of every domain item at one counter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRecord<K, O> {
    counter: u64,
    outcomes: Vec<(K, O)>,
}

impl<K, O> PredictionRecord<K, O> {
    /// Create a record for `counter` from `(item, outcome)` pairs in domain order.
    #[must_use]
    pub fn new(counter: u64, outcomes: Vec<(K, O)>) -> Self {
        Self { counter, outcomes }
    }

    /// Counter value this record was computed at.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Number of items in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if the domain was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// `(item, outcome)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &O)> + '_ {
        self.outcomes.iter().map(|(k, o)| (k, o))
    }

    /// Items in domain order.
    pub fn items(&self) -> impl Iterator<Item = &K> + '_ {
        self.outcomes.iter().map(|(k, _)| k)
    }
}

impl<K: PartialEq, O> PredictionRecord<K, O> {
    /// Outcome for `item`, if it is part of the record.
    pub fn get(&self, item: &K) -> Option<&O> {
        self.outcomes
            .iter()
            .find_map(|(k, o)| (k == item).then_some(o))
    }
}

/// Hit/miss counters since the last invalidation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
    /// Records currently cached.
    pub entries: usize,
}

/// Mapping from counter to [`PredictionRecord`].
///
/// Grows monotonically; there is no eviction. Counters sampled in practice are
/// small, so memory stays bounded by usage.
#[derive(Debug)]
pub struct PredictionCache<K, O> {
    entries: HashMap<u64, Rc<PredictionRecord<K, O>>>,
    hits: u64,
    misses: u64,
}

impl<K, O> Default for PredictionCache<K, O> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K, O> PredictionCache<K, O> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record for `counter` is cached.
    #[must_use]
    pub fn contains(&self, counter: u64) -> bool {
        self.entries.contains_key(&counter)
    }

    /// The cached record for `counter`, without touching statistics.
    #[must_use]
    pub fn get(&self, counter: u64) -> Option<Rc<PredictionRecord<K, O>>> {
        self.entries.get(&counter).cloned()
    }

    /// The cached record for `counter`, counted as a hit when present.
    ///
    /// Misses are not counted here; they are counted by the compute that follows.
    pub fn lookup(&mut self, counter: u64) -> Option<Rc<PredictionRecord<K, O>>> {
        let record = self.entries.get(&counter).cloned()?;
        self.hits += 1;
        trace!(counter, "prediction cache hit");
        Some(record)
    }

    /// Return the cached record for `counter`, or compute and store it.
    ///
    /// `compute` runs at most once. If it fails nothing is inserted.
    ///
    /// # Errors
    /// Propagates the error returned by `compute`.
    pub fn get_or_insert<E, F>(
        &mut self,
        counter: u64,
        compute: F,
    ) -> Result<Rc<PredictionRecord<K, O>>, E>
    where
        F: FnOnce() -> Result<PredictionRecord<K, O>, E>,
    {
        if let Some(record) = self.entries.get(&counter) {
            self.hits += 1;
            trace!(counter, "prediction cache hit");
            return Ok(Rc::clone(record));
        }

        self.misses += 1;
        debug!(counter, "prediction cache miss");
        let record = Rc::new(compute()?);
        self.entries.insert(counter, Rc::clone(&record));
        Ok(record)
    }

    /// Remove every entry and reset statistics.
    pub fn invalidate_all(&mut self) {
        debug!(entries = self.entries.len(), "invalidating prediction cache");
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
