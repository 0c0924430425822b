//! Convergence reporting.
//!
//! A [`ConvergenceReport`] accumulates the outcome of every action of a
//! run, in execution order, together with the declared documents that were
//! rejected before the diff. It distinguishes previews from committed
//! changes from failures so an operator can act on exactly the failed subset.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::LoadError;
use crate::planner::{ActionKind, ConvergenceAction, RunMode};
use crate::service::CustomerId;

/// Whether an action reached its target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The controller accepted the action (or the target state already held).
    Success,
    /// The controller rejected the action or could not be reached.
    Failure,
}

/// Outcome of one convergence action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvergenceResult {
    /// Customer the action targeted.
    pub customer: CustomerId,
    /// Kind of action.
    pub action: ActionKind,
    /// Mode the action ran in.
    pub mode: RunMode,
    /// Success or failure.
    pub outcome: Outcome,
    /// HTTP status, if the controller answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Digest of the written document, for upserts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Human-readable diagnostic.
    pub detail: String,
}

/// A declared document that was excluded from the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedDocument {
    /// Path of the document.
    pub path: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Report of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Service resource name.
    pub service: String,
    /// Mode of the run.
    pub mode: RunMode,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of customers the controller knew at the start of the run.
    pub observed: usize,
    /// Number of customers declared locally.
    pub declared: usize,
    /// Per-action results, in execution order.
    pub results: Vec<ConvergenceResult>,
    /// Declared documents excluded from the diff.
    pub rejected: Vec<RejectedDocument>,
}

impl ConvergenceResult {
    /// Creates a result for an action, without status or detail.
    #[must_use]
    pub fn new(action: &ConvergenceAction, mode: RunMode, outcome: Outcome) -> Self {
        Self {
            customer: action.customer().clone(),
            action: action.kind(),
            mode,
            outcome,
            status: None,
            digest: action.document().map(|d| d.digest.clone()),
            detail: String::new(),
        }
    }

    /// Sets the HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the diagnostic detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Returns true if the action succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// Returns `applied`, `previewed` or `failed`.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        match (self.outcome, self.mode) {
            (Outcome::Failure, _) => "failed",
            (Outcome::Success, RunMode::DryRun) => "previewed",
            (Outcome::Success, RunMode::Apply) => "applied",
        }
    }
}

impl From<&LoadError> for RejectedDocument {
    fn from(error: &LoadError) -> Self {
        Self {
            path: error.path().display().to_string(),
            reason: error.to_string(),
        }
    }
}

impl ConvergenceReport {
    /// Starts a new, empty report.
    #[must_use]
    pub fn new(service: impl Into<String>, mode: RunMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            service: service.into(),
            mode,
            started_at: Utc::now(),
            finished_at: None,
            observed: 0,
            declared: 0,
            results: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Appends a result.
    pub fn push(&mut self, result: ConvergenceResult) {
        self.results.push(result);
    }

    /// Records the documents rejected while loading the declared set.
    pub fn record_rejected<'e>(&mut self, errors: impl IntoIterator<Item = &'e LoadError>) {
        self.rejected.extend(errors.into_iter().map(RejectedDocument::from));
    }

    /// Marks the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns the number of committed changes.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.count_where(|r| matches!((r.outcome, r.mode), (Outcome::Success, RunMode::Apply)))
    }

    /// Returns the number of successful previews.
    #[must_use]
    pub fn previewed_count(&self) -> usize {
        self.count_where(|r| matches!((r.outcome, r.mode), (Outcome::Success, RunMode::DryRun)))
    }

    /// Returns the number of failed actions.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count_where(|r| r.outcome == Outcome::Failure)
    }

    fn count_where(&self, predicate: impl Fn(&ConvergenceResult) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(r)).count()
    }

    /// Iterates failed results.
    pub fn failures(&self) -> impl Iterator<Item = &ConvergenceResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Returns true if any action failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Returns true if every action succeeded and no document was rejected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.has_failures() && self.rejected.is_empty()
    }
}

impl std::fmt::Display for ConvergenceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Run {} ({}) on {}:", self.run_id, self.mode, self.service)?;
        for result in &self.results {
            writeln!(
                f,
                "  {} {} {}: {}",
                result.status_label(),
                result.action,
                result.customer,
                result.detail.lines().next().unwrap_or("")
            )?;
        }
        for rejected in &self.rejected {
            writeln!(f, "  rejected {}: {}", rejected.path, rejected.reason)?;
        }
        write!(
            f,
            "{} applied, {} previewed, {} failed, {} rejected",
            self.applied_count(),
            self.previewed_count(),
            self.failed_count(),
            self.rejected.len()
        )
    }
}
