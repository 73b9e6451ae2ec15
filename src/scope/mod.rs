//! Transactional scopes over external mutable state.
//!
//! A scope captures a fixed set of [`ManagedField`]s when it begins and writes
//! every captured value back when it ends, however it ends. Fields are listed
//! explicitly by the caller; nothing is discovered at runtime.
//!
//! Opening two scopes over the same field at the same time is unsupported. The
//! value left behind in that case is unspecified.

pub mod field;
pub mod guard;

pub use field::{FieldAccessor, ManagedField};
pub use guard::StateScope;
