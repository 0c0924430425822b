//! Planning module for convergence operations.
//!
//! This module handles the comparison between declared and observed
//! customers and the execution of the resulting actions.

mod diff;
mod plan;
mod executor;

pub use diff::DiffEngine;
pub use plan::{ActionKind, ConvergenceAction, ConvergencePlan, RunMode};
pub use executor::{ActionExecutor, ALREADY_ABSENT};
