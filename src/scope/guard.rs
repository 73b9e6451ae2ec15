//! Scope guard with deterministic restoration.

use std::fmt;

use tracing::{debug, error, warn};

use crate::error::{FieldError, PredictError, PredictResult};
use crate::value::FieldValue;

use super::field::ManagedField;

struct Captured<'a> {
    field: &'a dyn ManagedField,
    value: FieldValue,
}

/// Captures a set of managed fields and restores them when the scope ends.
///
/// - Values are captured in the order given, before the caller can mutate anything.
/// - [`finish`](Self::finish) restores and reports every failure.
/// - Dropping an unfinished scope (early return, `?`, panic unwind) restores on a
///   best-effort basis and logs failures, since `Drop` cannot return them.
///
/// A scope is used exactly once. Fields whose current value already equals the
/// captured value are not written.
#[must_use = "a scope restores its fields when dropped; bind it for the duration of the mutation"]
pub struct StateScope<'a> {
    captured: Vec<Captured<'a>>,
    restored: bool,
}

impl<'a> StateScope<'a> {
    /// Capture the current value of every field.
    pub fn begin(fields: &[&'a dyn ManagedField]) -> Self {
        let captured = fields
            .iter()
            .map(|&field| {
                let value = field.get();
                debug!(field = field.name(), %value, "captured managed field");
                Captured { field, value }
            })
            .collect();

        Self {
            captured,
            restored: false,
        }
    }

    /// Run `body` inside a scope over `fields`, restoring them afterwards.
    ///
    /// Restoration happens whether `body` succeeds, fails or panics. When both
    /// the body and the restoration fail, the restoration failure is returned
    /// and the body error is logged.
    ///
    /// # Errors
    /// The body's error, or [`PredictError::RestoreFailure`].
    pub fn run<T, F>(fields: &[&'a dyn ManagedField], body: F) -> PredictResult<T>
    where
        F: FnOnce() -> PredictResult<T>,
    {
        let scope = Self::begin(fields);
        let outcome = body();
        scope.settle(outcome)
    }

    /// End the scope and fold the restoration result into `outcome`.
    ///
    /// A restoration failure replaces any error in `outcome`; the replaced
    /// error is logged.
    ///
    /// # Errors
    /// The error in `outcome`, or [`PredictError::RestoreFailure`].
    pub fn settle<T>(self, outcome: PredictResult<T>) -> PredictResult<T> {
        match (outcome, self.finish()) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(err), Ok(())) | (Ok(_), Err(err)) => Err(err),
            (Err(body_err), Err(restore_err)) => {
                warn!(error = %body_err, "scope body failed and restoration also failed");
                Err(restore_err)
            }
        }
    }

    /// Number of captured fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captured.len()
    }

    /// True when the scope manages no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// The captured `(name, value)` snapshot, in capture order.
    pub fn captured(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.captured.iter().map(|c| (c.field.name(), &c.value))
    }

    /// End the scope, restoring every field.
    ///
    /// # Errors
    /// Returns [`PredictError::RestoreFailure`] listing every field that could not
    /// be restored. All fields are attempted regardless of earlier failures.
    pub fn finish(mut self) -> PredictResult<()> {
        let failures = self.restore_all();
        if failures.is_empty() {
            return Ok(());
        }
        for failure in &failures {
            warn!(
                field = failure.field_name(),
                error = %failure,
                "failed to restore managed field"
            );
        }
        Err(PredictError::RestoreFailure { failures })
    }

    fn restore_all(&mut self) -> Vec<FieldError> {
        self.restored = true;

        let mut failures = Vec::new();
        for captured in &self.captured {
            let current = captured.field.get();
            if current == captured.value {
                continue;
            }
            debug!(
                field = captured.field.name(),
                %current,
                original = %captured.value,
                "restoring managed field"
            );
            if let Err(err) = captured.field.set(captured.value.clone()) {
                failures.push(err);
            }
        }
        failures
    }
}

impl Drop for StateScope<'_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        for failure in self.restore_all() {
            error!(
                field = failure.field_name(),
                error = %failure,
                "failed to restore managed field on drop"
            );
        }
    }
}

impl fmt::Debug for StateScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateScope")
            .field("captured", &self.captured().collect::<Vec<_>>())
            .field("restored", &self.restored)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};

    use crate::scope::FieldAccessor;

    struct CellField<'c> {
        name: &'static str,
        cell: &'c Cell<u64>,
        writes: Cell<usize>,
        locked: Cell<bool>,
    }

    impl<'c> CellField<'c> {
        fn new(name: &'static str, cell: &'c Cell<u64>) -> Self {
            Self {
                name,
                cell,
                writes: Cell::new(0),
                locked: Cell::new(false),
            }
        }
    }

    impl ManagedField for CellField<'_> {
        fn name(&self) -> &str {
            self.name
        }

        fn get(&self) -> FieldValue {
            FieldValue::Unsigned(self.cell.get())
        }

        fn set(&self, value: FieldValue) -> Result<(), FieldError> {
            if self.locked.get() {
                return Err(FieldError::rejected(self.name, "locked"));
            }
            self.writes.set(self.writes.get() + 1);
            self.cell.set(value.expect_unsigned(self.name)?);
            Ok(())
        }
    }

    #[test]
    fn finish_restores_mutated_fields() {
        let cell = Cell::new(4);
        let field = CellField::new("counter", &cell);

        let scope = StateScope::begin(&[&field]);
        assert_eq!(scope.len(), 1);
        cell.set(99);
        scope.finish().unwrap();

        assert_eq!(cell.get(), 4);
        assert_eq!(field.writes.get(), 1);
    }

    #[test]
    fn unchanged_fields_are_not_written() {
        let cell = Cell::new(4);
        let field = CellField::new("counter", &cell);

        let scope = StateScope::begin(&[&field]);
        cell.set(10);
        cell.set(4);
        scope.finish().unwrap();

        assert_eq!(field.writes.get(), 0);
    }

    #[test]
    fn drop_restores_on_early_return() {
        fn mutate_then_bail(field: &CellField<'_>, cell: &Cell<u64>) -> PredictResult<()> {
            let _scope = StateScope::begin(&[field]);
            cell.set(500);
            Err(PredictError::configuration("bail"))
        }

        let cell = Cell::new(1);
        let field = CellField::new("counter", &cell);
        assert!(mutate_then_bail(&field, &cell).is_err());
        assert_eq!(cell.get(), 1);
    }

    #[test]
    fn drop_restores_on_panic() {
        let cell = Cell::new(8);
        let field = CellField::new("counter", &cell);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _scope = StateScope::begin(&[&field]);
            cell.set(1000);
            panic!("outcome function exploded");
        }));

        assert!(result.is_err());
        assert_eq!(cell.get(), 8);
    }

    #[test]
    fn every_field_is_attempted_and_failures_aggregate() {
        let a = Cell::new(1);
        let b = Cell::new(2);
        let c = Cell::new(3);
        let fa = CellField::new("a", &a);
        let fb = CellField::new("b", &b);
        let fc = CellField::new("c", &c);

        let scope = StateScope::begin(&[&fa, &fb, &fc]);
        a.set(10);
        b.set(20);
        c.set(30);
        fa.locked.set(true);
        fc.locked.set(true);

        let err = scope.finish().unwrap_err();
        let PredictError::RestoreFailure { failures } = err else {
            panic!("expected RestoreFailure");
        };
        let names: Vec<_> = failures.iter().map(FieldError::field_name).collect();
        assert_eq!(names, vec!["a", "c"]);

        // The middle field was still restored.
        assert_eq!(b.get(), 2);
        assert_eq!(a.get(), 10);
        assert_eq!(c.get(), 30);
    }

    #[test]
    fn run_returns_body_value_and_restores() {
        let cell = Cell::new(0);
        let field = CellField::new("counter", &cell);

        let seen = StateScope::run(&[&field], || {
            cell.set(42);
            Ok(cell.get() * 2)
        })
        .unwrap();

        assert_eq!(seen, 84);
        assert_eq!(cell.get(), 0);
    }

    #[test]
    fn run_prefers_restore_failure_over_body_error() {
        let cell = Cell::new(0);
        let field = CellField::new("counter", &cell);

        let err = StateScope::run(&[&field], || -> PredictResult<()> {
            cell.set(7);
            field.locked.set(true);
            Err(PredictError::configuration("body failed"))
        })
        .unwrap_err();

        assert!(err.is_restore_failure());
    }

    #[test]
    fn run_propagates_body_error_after_restoring() {
        let cell = Cell::new(3);
        let field = CellField::new("counter", &cell);

        let err = StateScope::run(&[&field], || -> PredictResult<()> {
            cell.set(9);
            Err(PredictError::InvalidRange { first: 2, last: 1 })
        })
        .unwrap_err();

        assert!(err.is_invalid_range());
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn captured_snapshot_keeps_order() {
        let flag = Cell::new(true);
        let count = Cell::new(5u64);
        let flag_field = FieldAccessor::new(
            "flag",
            || FieldValue::Bool(flag.get()),
            |v: FieldValue| {
                flag.set(v.as_bool().unwrap_or_default());
                Ok(())
            },
        );
        let count_field = CellField::new("count", &count);

        let scope = StateScope::begin(&[&flag_field, &count_field]);
        let snapshot: Vec<_> = scope
            .captured()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        assert_eq!(
            snapshot,
            vec![
                ("flag".to_string(), FieldValue::Bool(true)),
                ("count".to_string(), FieldValue::Unsigned(5)),
            ]
        );

        flag.set(false);
        drop(scope);
        assert!(flag.get());
    }
}
