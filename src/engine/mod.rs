//! Prediction engine.
//!
//! The engine answers "what would each domain item yield at counter N" by
//! temporarily moving the oracle's counter inside a [`StateScope`], sampling
//! the outcome function, and memoizing the result per counter.

pub mod window;

pub use window::{PredictionDirection, TimelinePosition, WindowEntry};

use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, PredictionCache, PredictionRecord};
use crate::config::PredictorConfig;
use crate::domain::{DomainCache, DomainProvider};
use crate::error::{PredictError, PredictResult};
use crate::oracle::{CounterField, Oracle};
use crate::scope::StateScope;

/// Oracle handle held by an engine.
pub type SharedOracle<K, O> = Rc<dyn Oracle<Item = K, Outcome = O>>;

/// Domain provider handle held by an engine.
pub type SharedProvider<K> = Rc<dyn DomainProvider<Item = K>>;

/// Record handle returned by predictions; shared with the cache.
pub type SharedRecord<K, O> = Rc<PredictionRecord<K, O>>;

/// Speculative prediction engine.
///
/// Single-threaded: the engine holds `Rc` handles and assumes one caller at a
/// time. External code must not move the oracle's counter while a prediction
/// is running.
pub struct PredictionEngine<K, O> {
    oracle: Option<SharedOracle<K, O>>,
    provider: Option<SharedProvider<K>>,
    domain: DomainCache<K>,
    cache: PredictionCache<K, O>,
    config: PredictorConfig,
}

impl<K, O> fmt::Debug for PredictionEngine<K, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("has_oracle", &self.oracle.is_some())
            .field("has_provider", &self.provider.is_some())
            .field("domain_stale", &self.domain.is_stale())
            .field("cache", &self.cache.stats())
            .field("config", &self.config)
            .finish()
    }
}

impl<K, O> PredictionEngine<K, O>
where
    K: Clone + fmt::Debug + 'static,
    O: 'static,
{
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(oracle: SharedOracle<K, O>, provider: SharedProvider<K>) -> Self {
        Self {
            oracle: Some(oracle),
            provider: Some(provider),
            domain: DomainCache::new(),
            cache: PredictionCache::new(),
            config: PredictorConfig::default(),
        }
    }

    /// Create an engine with an explicit configuration.
    ///
    /// # Errors
    /// Returns a validation error if `config` is invalid.
    pub fn with_config(
        oracle: SharedOracle<K, O>,
        provider: SharedProvider<K>,
        config: PredictorConfig,
    ) -> PredictResult<Self> {
        let mut engine = Self::unconfigured(config)?;
        engine.oracle = Some(oracle);
        engine.provider = Some(provider);
        Ok(engine)
    }

    /// Create an engine with no oracle or provider attached yet.
    ///
    /// Predictions fail with a configuration error until both are set.
    ///
    /// # Errors
    /// Returns a validation error if `config` is invalid.
    pub fn unconfigured(config: PredictorConfig) -> PredictResult<Self> {
        config.validate()?;
        Ok(Self {
            oracle: None,
            provider: None,
            domain: DomainCache::new(),
            cache: PredictionCache::new(),
            config,
        })
    }

    /// The attached oracle, if any.
    pub fn oracle(&self) -> Option<&SharedOracle<K, O>> {
        self.oracle.as_ref()
    }

    /// The attached domain provider, if any.
    pub fn provider(&self) -> Option<&SharedProvider<K>> {
        self.provider.as_ref()
    }

    /// The engine configuration.
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Replace the oracle.
    ///
    /// A different oracle may have different outcome semantics, so the domain and
    /// the prediction cache are discarded. Re-attaching the same handle is a no-op.
    pub fn set_oracle(&mut self, oracle: SharedOracle<K, O>) {
        if self
            .oracle
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, &oracle))
        {
            return;
        }
        self.oracle = Some(oracle);
        self.reset("oracle replaced");
    }

    /// Replace the domain provider.
    ///
    /// The domain and the prediction cache are discarded. Re-attaching the same
    /// handle is a no-op.
    pub fn set_provider(&mut self, provider: SharedProvider<K>) {
        if self
            .provider
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, &provider))
        {
            return;
        }
        self.provider = Some(provider);
        self.reset("provider replaced");
    }

    /// Discard the domain and every cached prediction.
    ///
    /// The attached oracle and provider are kept; the next prediction lists the
    /// domain again and recomputes.
    pub fn invalidate(&mut self) {
        info!(cached = self.cache.len(), "invalidating prediction domain and cache");
        self.domain.invalidate();
        self.cache.invalidate_all();
    }

    fn reset(&mut self, reason: &'static str) {
        info!(
            reason,
            cached = self.cache.len(),
            "resetting prediction domain and cache"
        );
        self.domain = DomainCache::new();
        self.cache = PredictionCache::new();
    }

    /// Cache statistics since the last reset.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether a prediction for `counter` is already cached.
    #[must_use]
    pub fn is_cached(&self, counter: u64) -> bool {
        self.cache.contains(counter)
    }

    /// The current domain, fetched from the provider if stale.
    ///
    /// # Errors
    /// Returns a configuration error if no provider is attached or its content
    /// is unavailable.
    pub fn domain(&mut self) -> PredictResult<Rc<[K]>> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| PredictError::configuration("no domain provider attached"))?;
        self.domain
            .get_or_fetch(&**provider)
            .map_err(|e| PredictError::configuration(format!("domain provider unavailable: {e}")))
    }

    /// The oracle's real counter.
    ///
    /// # Errors
    /// Returns a configuration error if no ready oracle is attached.
    pub fn current_counter(&self) -> PredictResult<u64> {
        Ok(self.ready_oracle()?.counter())
    }

    /// Predict every domain item's outcome at `counter`.
    ///
    /// A cached prediction is returned without touching the oracle.
    ///
    /// # Errors
    /// Configuration, compute or restore failures.
    pub fn predict_at(&mut self, counter: u64) -> PredictResult<SharedRecord<K, O>> {
        let mut records = self.predict_counters(std::iter::once(counter))?;
        records
            .pop()
            .ok_or_else(|| PredictError::configuration("prediction produced no record"))
    }

    /// Predict counters `first..last`, ascending.
    ///
    /// One scope covers the whole range. The first compute failure aborts the
    /// call with no partial results, after the counter has been restored.
    ///
    /// # Errors
    /// [`PredictError::InvalidRange`] if `first > last`; otherwise configuration,
    /// compute or restore failures.
    pub fn predict_range(
        &mut self,
        first: u64,
        last: u64,
    ) -> PredictResult<Vec<SharedRecord<K, O>>> {
        if first > last {
            return Err(PredictError::InvalidRange { first, last });
        }
        if first == last {
            return Ok(Vec::new());
        }
        debug!(first, last, "predicting range");
        self.predict_counters(first..last)
    }

    /// Predict the `distance` counters starting at the current one.
    ///
    /// # Errors
    /// See [`predict_range`](Self::predict_range).
    pub fn predict_ahead(&mut self, distance: u64) -> PredictResult<Vec<SharedRecord<K, O>>> {
        let current = self.current_counter()?;
        self.predict_range(current, current.saturating_add(distance))
    }

    /// Predict up to `distance` counters immediately before the current one.
    ///
    /// # Errors
    /// See [`predict_range`](Self::predict_range).
    pub fn predict_behind(&mut self, distance: u64) -> PredictResult<Vec<SharedRecord<K, O>>> {
        let current = self.current_counter()?;
        self.predict_range(current.saturating_sub(distance), current)
    }

    /// Predict from `behind` counters back to `ahead` counters forward.
    ///
    /// # Errors
    /// See [`predict_range`](Self::predict_range).
    pub fn predict_window(
        &mut self,
        ahead: u64,
        behind: u64,
    ) -> PredictResult<Vec<SharedRecord<K, O>>> {
        let current = self.current_counter()?;
        self.predict_range(current.saturating_sub(behind), current.saturating_add(ahead))
    }

    fn ready_oracle(&self) -> PredictResult<&SharedOracle<K, O>> {
        let oracle = self
            .oracle
            .as_ref()
            .ok_or_else(|| PredictError::configuration("no oracle attached"))?;
        if !oracle.is_ready() {
            return Err(PredictError::configuration("oracle is not ready"));
        }
        Ok(oracle)
    }

    fn predict_counters<I>(&mut self, counters: I) -> PredictResult<Vec<SharedRecord<K, O>>>
    where
        I: IntoIterator<Item = u64>,
    {
        let oracle = Rc::clone(self.ready_oracle()?);
        let field = CounterField::new(&*oracle);
        let mut scope = None;
        let mut records = Vec::new();

        let outcome = self.fill(&*oracle, &field, &mut scope, counters, &mut records);
        match scope {
            Some(scope) => scope.settle(outcome)?,
            None => outcome?,
        }
        Ok(records)
    }

    /// Resolve each counter from the cache, opening `scope` on the first miss.
    fn fill<'f, I>(
        &mut self,
        oracle: &'f dyn Oracle<Item = K, Outcome = O>,
        field: &'f CounterField<'f, dyn Oracle<Item = K, Outcome = O>>,
        scope: &mut Option<StateScope<'f>>,
        counters: I,
        records: &mut Vec<SharedRecord<K, O>>,
    ) -> PredictResult<()>
    where
        I: IntoIterator<Item = u64>,
    {
        for counter in counters {
            if let Some(record) = self.cache.lookup(counter) {
                records.push(record);
                continue;
            }

            let domain = self.domain()?;
            if scope.is_none() {
                *scope = Some(StateScope::begin(&[field]));
            }
            let record = self
                .cache
                .get_or_insert(counter, || compute_record(oracle, &domain, counter))?;
            records.push(record);
        }
        Ok(())
    }
}

fn compute_record<K, O>(
    oracle: &dyn Oracle<Item = K, Outcome = O>,
    domain: &[K],
    counter: u64,
) -> PredictResult<PredictionRecord<K, O>>
where
    K: Clone + fmt::Debug,
{
    oracle
        .set_counter(counter)
        .map_err(|e| PredictError::ComputeFailure {
            counter,
            item: None,
            reason: e.to_string(),
        })?;

    let mut outcomes = Vec::with_capacity(domain.len());
    for item in domain {
        let outcome = oracle.compute_outcome(item).map_err(|e| {
            warn!(counter, ?item, error = %e, "outcome computation failed");
            PredictError::ComputeFailure {
                counter,
                item: Some(format!("{item:?}")),
                reason: e.to_string(),
            }
        })?;
        outcomes.push((item.clone(), outcome));
    }
    Ok(PredictionRecord::new(counter, outcomes))
}
