//! Remote controller integration module.
//!
//! This module provides the client capability the reconciler depends on,
//! its RESTCONF implementation, and extraction of structured detail from
//! controller responses.

mod client;
mod restconf;
pub mod payload;

#[cfg(test)]
pub(crate) use client::MockRemoteStateClient;
pub use client::{ControllerResult, RemoteOutcome, RemoteStateClient, STATUS_NOT_FOUND};
pub use payload::DeviceChange;
pub use restconf::{Operation, RestconfClient};
