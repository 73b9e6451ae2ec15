//! The oracle: an ambient counter plus an outcome function that reads it.
//!
//! Outcomes are a pure function of the oracle's *current* counter, which is
//! why the engine has to overwrite the real counter to sample other values and
//! restore it afterwards.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{ComputeError, FieldError};
use crate::scope::ManagedField;
use crate::value::FieldValue;

/// External process whose outcomes depend on an ambient counter.
///
/// All methods take `&self`. The counter is interior-mutable state owned by the
/// host, and the engine assumes nobody else touches it while a prediction runs.
pub trait Oracle {
    /// Identity of a predictable item.
    type Item;
    /// What computing an item yields.
    type Outcome;

    /// Current value of the ambient counter.
    fn counter(&self) -> u64;

    /// Overwrite the ambient counter.
    ///
    /// # Errors
    /// Returns a [`FieldError`] if the host refuses the write.
    fn set_counter(&self, counter: u64) -> Result<(), FieldError>;

    /// Compute the outcome for `item` at the current counter.
    ///
    /// # Errors
    /// Returns a [`ComputeError`] if the outcome cannot be computed.
    fn compute_outcome(&self, item: &Self::Item) -> Result<Self::Outcome, ComputeError>;

    /// Whether the host is in a state where predictions make sense.
    fn is_ready(&self) -> bool {
        true
    }
}

/// [`ManagedField`] view of an oracle's counter.
pub struct CounterField<'o, T: ?Sized> {
    oracle: &'o T,
}

impl<'o, T: Oracle + ?Sized> CounterField<'o, T> {
    /// Field name used in logs and restore failures.
    pub const NAME: &'static str = "counter";

    /// Wrap `oracle`'s counter.
    pub fn new(oracle: &'o T) -> Self {
        Self { oracle }
    }
}

impl<T: Oracle + ?Sized> ManagedField for CounterField<'_, T> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&self) -> FieldValue {
        FieldValue::Unsigned(self.oracle.counter())
    }

    fn set(&self, value: FieldValue) -> Result<(), FieldError> {
        let counter = value.expect_unsigned(Self::NAME)?;
        self.oracle.set_counter(counter)
    }
}

impl<T: ?Sized> fmt::Debug for CounterField<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterField").finish_non_exhaustive()
    }
}

/// In-memory reference oracle.
///
/// Holds its counter in a `Cell` and computes outcomes with a closure that is
/// handed the counter explicitly. Useful for embedding and tests.
pub struct CellOracle<K, O, F> {
    counter: Cell<u64>,
    ready: Cell<bool>,
    outcome: F,
    _marker: PhantomData<fn(&K) -> O>,
}

impl<K, O, F> CellOracle<K, O, F>
where
    F: Fn(u64, &K) -> Result<O, ComputeError>,
{
    /// Create an oracle starting at `counter`.
    pub fn new(counter: u64, outcome: F) -> Self {
        Self {
            counter: Cell::new(counter),
            ready: Cell::new(true),
            outcome,
            _marker: PhantomData,
        }
    }

    /// Mark the oracle ready or not ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    /// Advance the real counter by one, as the host does when an item is consumed.
    pub fn advance(&self) {
        self.counter.set(self.counter.get().saturating_add(1));
    }
}

impl<K, O, F> Oracle for CellOracle<K, O, F>
where
    F: Fn(u64, &K) -> Result<O, ComputeError>,
{
    type Item = K;
    type Outcome = O;

    fn counter(&self) -> u64 {
        self.counter.get()
    }

    fn set_counter(&self, counter: u64) -> Result<(), FieldError> {
        self.counter.set(counter);
        Ok(())
    }

    fn compute_outcome(&self, item: &K) -> Result<O, ComputeError> {
        (self.outcome)(self.counter.get(), item)
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }
}

impl<K, O, F> fmt::Debug for CellOracle<K, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellOracle")
            .field("counter", &self.counter.get())
            .field("ready", &self.ready.get())
            .finish_non_exhaustive()
    }
}
