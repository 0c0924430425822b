// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # NSO Provision
//!
//! Declarative, idempotent provisioning of per-customer service instances
//! on an NSO controller over RESTCONF.
//!
//! ## Overview
//!
//! Each customer of a service is described by one YAML document. A run
//! converges the controller to exactly that set of documents:
//!
//! - Every declared customer is written with a full-replace upsert
//! - Every provisioned customer without a document is deleted
//! - Runs can be previewed with the controller's native dry run
//! - Failures are scoped to one customer; the run carries on
//!
//! ## Architecture
//!
//! The system is built around **declared state reconciliation**:
//!
//! 1. **Declared Set**: Loaded from the documents directory
//! 2. **Observed Set**: Queried from the controller
//! 3. **Reconciler**: Diffs the two and drives every action in order
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`service`]: Customer documents and the declared/observed sets
//! - [`controller`]: RESTCONF client and payload extraction
//! - [`planner`]: Diff computation and action execution
//! - [`reconciler`]: Reconciliation runs
//! - [`report`]: Per-action results and run reports
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! controller:
//!   url: https://nso.example.net:8888
//!   username: admin
//!
//! service:
//!   path: l2vpn
//!   key: l2vpn
//!   documents_dir: services
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod planner;
pub mod reconciler;
pub mod report;
pub mod service;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, ProvisionConfig};
pub use controller::{RemoteStateClient, RestconfClient};
pub use error::{ProvisionError, Result};
pub use planner::{ConvergencePlan, DiffEngine, RunMode};
pub use reconciler::{PreparedRun, Reconciler};
pub use report::{ConvergenceReport, ConvergenceResult, Outcome};
pub use service::{CustomerId, DeclaredSetLoader};
