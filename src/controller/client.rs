//! Remote state client contract.
//!
//! This module defines the capability the reconciler consumes to read and
//! converge the controller's view of the service. Implementations own the
//! transport and authentication; the reconciler owns the interpretation of
//! outcomes.

use async_trait::async_trait;

use crate::error::ControllerError;
use crate::service::{CustomerId, ObservedSet, ServiceDocument};

/// Result type for controller operations.
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// HTTP status the controller uses for a missing resource.
pub const STATUS_NOT_FOUND: u16 = 404;

/// Raw outcome of a write or delete the controller answered.
///
/// Transport failures never produce an outcome; they surface as
/// [`ControllerError::Transport`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutcome {
    /// HTTP status code.
    pub status: u16,
    /// Response body, possibly empty.
    pub body: String,
}

impl RemoteOutcome {
    /// Creates an outcome from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the controller reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == STATUS_NOT_FOUND
    }
}

/// Capability for reading and converging the controller's service state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStateClient: Send + Sync {
    /// Lists the customers currently provisioned for the service.
    ///
    /// A service the controller does not know yet yields an empty set.
    async fn list_customers(&self) -> ControllerResult<ObservedSet>;

    /// Replaces the customer's entire service subtree with `document`.
    ///
    /// With `dry_run` set the controller only validates and simulates.
    async fn upsert_customer(
        &self,
        customer: &CustomerId,
        document: &ServiceDocument,
        dry_run: bool,
    ) -> ControllerResult<RemoteOutcome>;

    /// Deletes the customer's service subtree.
    ///
    /// A not-found answer is returned as-is; the caller decides what it means.
    async fn remove_customer(
        &self,
        customer: &CustomerId,
        dry_run: bool,
    ) -> ControllerResult<RemoteOutcome>;
}
