//! Customer service definitions.
//!
//! This module holds the domain data of a run: customer identifiers,
//! declared service documents, the declared and observed customer sets,
//! and the loader that builds the declared set from disk.

mod types;
mod loader;
mod hash;

pub use types::{CustomerId, DeclaredSet, ObservedSet, ServiceDocument};
pub use loader::{DeclaredSetLoader, LoadOutcome};
pub use hash::DocumentHasher;
