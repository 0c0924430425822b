//! Action executor for converging individual customers.
//!
//! This module issues one convergence action against the controller and
//! classifies the answer. It never fails: transport errors and rejections
//! become Failure results so the run can move on to the next action.

use tracing::{error, info, warn};

use crate::controller::{payload, RemoteOutcome, RemoteStateClient};
use crate::error::ControllerError;
use crate::report::{ConvergenceResult, Outcome};

use super::plan::{ConvergenceAction, RunMode};

/// Detail recorded when a removal finds nothing to remove.
pub const ALREADY_ABSENT: &str = "already absent";

/// Executor for convergence actions.
#[derive(Debug)]
pub struct ActionExecutor<'a, C: RemoteStateClient + ?Sized> {
    /// Controller client.
    client: &'a C,
}

impl<'a, C: RemoteStateClient + ?Sized> ActionExecutor<'a, C> {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Applies one action in the given mode and reports its outcome.
    pub async fn apply_action(
        &self,
        action: &ConvergenceAction,
        mode: RunMode,
    ) -> ConvergenceResult {
        let suffix = if mode.is_dry_run() { " (dry run)" } else { "" };
        info!("{}{suffix}", action.description());

        let dry_run = mode.is_dry_run();
        let response = match action {
            ConvergenceAction::Upsert(customer, document) => {
                self.client.upsert_customer(customer, document, dry_run).await
            }
            ConvergenceAction::Remove(customer) => {
                self.client.remove_customer(customer, dry_run).await
            }
        };

        let result = match response {
            Ok(outcome) => Self::classify(action, mode, &outcome),
            Err(e) => Self::transport_failure(action, mode, &e),
        };

        match result.outcome {
            Outcome::Success => info!(
                "{} {} for customer {} returned {}",
                action.kind(),
                mode,
                action.customer(),
                result.status.map_or_else(|| String::from("-"), |s| s.to_string())
            ),
            Outcome::Failure => error!(
                "{} {} for customer {} failed: {}",
                action.kind(),
                mode,
                action.customer(),
                result.detail
            ),
        }

        result
    }

    /// Classifies a controller answer.
    fn classify(
        action: &ConvergenceAction,
        mode: RunMode,
        outcome: &RemoteOutcome,
    ) -> ConvergenceResult {
        if outcome.is_success() {
            return ConvergenceResult::new(action, mode, Outcome::Success)
                .with_status(outcome.status)
                .with_detail(Self::success_detail(mode, outcome));
        }

        match action {
            ConvergenceAction::Remove(customer) if outcome.is_not_found() => {
                warn!("Customer {customer} is not provisioned; nothing to delete");
                ConvergenceResult::new(action, mode, Outcome::Success)
                    .with_status(outcome.status)
                    .with_detail(ALREADY_ABSENT)
            }
            ConvergenceAction::Upsert(customer, _) if outcome.is_not_found() => {
                warn!(
                    "Controller answered not-found to a full-replace write for {customer}; \
                     treating as failure"
                );
                Self::rejection(action, mode, outcome)
            }
            _ => Self::rejection(action, mode, outcome),
        }
    }

    /// Builds the detail of a successful answer.
    fn success_detail(mode: RunMode, outcome: &RemoteOutcome) -> String {
        if !mode.is_dry_run() {
            return format!("accepted by controller ({})", outcome.status);
        }

        match payload::extract_dry_run(&outcome.body) {
            Some(devices) if devices.is_empty() => String::from("no device changes"),
            Some(devices) => payload::render_devices(&devices),
            None => format!("dry run accepted ({})", outcome.status),
        }
    }

    /// Builds a Failure result for a non-success answer.
    fn rejection(
        action: &ConvergenceAction,
        mode: RunMode,
        outcome: &RemoteOutcome,
    ) -> ConvergenceResult {
        let detail = payload::extract_errors(&outcome.body).unwrap_or_else(|| {
            let body = outcome.body.trim();
            if body.is_empty() {
                String::from("no error detail")
            } else {
                body.to_string()
            }
        });

        ConvergenceResult::new(action, mode, Outcome::Failure)
            .with_status(outcome.status)
            .with_detail(format!("rejected by controller ({}): {detail}", outcome.status))
    }

    /// Builds a Failure result for an unreachable controller.
    fn transport_failure(
        action: &ConvergenceAction,
        mode: RunMode,
        e: &ControllerError,
    ) -> ConvergenceResult {
        ConvergenceResult::new(action, mode, Outcome::Failure).with_detail(e.to_string())
    }
}
