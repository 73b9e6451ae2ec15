//! # foresight - speculative counter prediction
//!
//! foresight predicts what a process will produce at counter values it has not
//! reached yet. The process's outcomes are a pure function of an ambient,
//! monotonically advancing counter, so a prediction temporarily moves that
//! counter, samples the outcome function, and puts the counter back.
//!
//! ## Core Concepts
//!
//! - **ManagedField**: a getter/setter pair over one external mutable value
//! - **StateScope**: captures managed fields and restores them on every exit path
//! - **Oracle**: the ambient counter plus the outcome function that reads it
//! - **Domain**: the item kinds currently predictable, classified from raw content
//! - **PredictionCache**: counter-keyed memoization, invalidated when the domain changes
//! - **PredictionEngine**: ties the above together
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use foresight::{
//!     CellOracle, ClassifiedDomain, ComputeError, DescriptorClassifier, ItemId, Oracle,
//!     PredictionEngine, StaticContent,
//! };
//!
//! let oracle = Rc::new(CellOracle::new(0, |counter, item: &ItemId| {
//!     Ok::<_, ComputeError>(counter * 2 + u64::from(item.key()))
//! }));
//! let provider = Rc::new(ClassifiedDomain::new(
//!     StaticContent::from_pairs([(535, "Geode/50"), (80, "Quartz/25")]),
//!     DescriptorClassifier::geodes(),
//! ));
//!
//! let mut engine: PredictionEngine<ItemId, u64> =
//!     PredictionEngine::new(oracle.clone(), provider);
//! let record = engine.predict_at(5)?;
//!
//! assert_eq!(record.get(&ItemId::new(535)), Some(&545));
//! assert_eq!(oracle.counter(), 0);
//! # Ok::<(), foresight::PredictError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod scope;
pub mod value;

// Re-export primary types at crate root for convenience
pub use cache::{CacheStats, PredictionCache, PredictionRecord};
pub use config::PredictorConfig;
pub use domain::{
    ClassifiedDomain, ContentSource, DescriptorClassifier, DescriptorMatch, DomainCache,
    DomainClassifier, DomainProvider, ItemId, RawRecord, StaticContent,
};
pub use engine::{
    PredictionDirection, PredictionEngine, SharedOracle, SharedProvider, SharedRecord,
    TimelinePosition, WindowEntry,
};
pub use error::{
    ComputeError, FieldError, PredictError, PredictResult, ProviderError, ValidationError,
};
pub use oracle::{CellOracle, CounterField, Oracle};
pub use scope::{FieldAccessor, ManagedField, StateScope};
pub use value::FieldValue;
