//! Convergence plan types.
//!
//! This module defines the actions a run issues against the controller and
//! the ordered plan they are grouped into.

use serde::Serialize;

use crate::service::{CustomerId, ServiceDocument};

/// One step towards convergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceAction {
    /// Full-replace write of the customer's declared document.
    Upsert(CustomerId, ServiceDocument),
    /// Deletion of a customer that is no longer declared.
    Remove(CustomerId),
}

/// Kind of a convergence action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Create-or-replace.
    Upsert,
    /// Delete.
    Remove,
}

/// Mode a run (and each of its actions) executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// The controller validates and simulates; nothing is committed.
    DryRun,
    /// Changes are committed.
    Apply,
}

impl ConvergenceAction {
    /// Returns the customer this action targets.
    #[must_use]
    pub const fn customer(&self) -> &CustomerId {
        match self {
            Self::Upsert(customer, _) | Self::Remove(customer) => customer,
        }
    }

    /// Returns the kind of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Upsert(..) => ActionKind::Upsert,
            Self::Remove(_) => ActionKind::Remove,
        }
    }

    /// Returns the document an upsert writes.
    #[must_use]
    pub const fn document(&self) -> Option<&ServiceDocument> {
        match self {
            Self::Upsert(_, document) => Some(document),
            Self::Remove(_) => None,
        }
    }

    /// Returns a human-readable description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Upsert(customer, _) => format!("Provision service for customer \"{customer}\""),
            Self::Remove(customer) => format!("Delete service for customer \"{customer}\""),
        }
    }
}

impl RunMode {
    /// Returns true for dry runs.
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// The ordered actions of one run: all upserts, then all removals.
#[derive(Debug, Clone, Default)]
pub struct ConvergencePlan {
    /// Actions in execution order.
    pub actions: Vec<ConvergenceAction>,
}

impl ConvergencePlan {
    /// Creates a plan from an ordered action sequence.
    #[must_use]
    pub const fn new(actions: Vec<ConvergenceAction>) -> Self {
        Self { actions }
    }

    /// Returns true if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of upserts.
    #[must_use]
    pub fn upsert_count(&self) -> usize {
        self.count(ActionKind::Upsert)
    }

    /// Returns the number of removals.
    #[must_use]
    pub fn remove_count(&self) -> usize {
        self.count(ActionKind::Remove)
    }

    fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upsert => "upsert",
            Self::Remove => "remove",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DryRun => "dry-run",
            Self::Apply => "apply",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for ConvergenceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.customer())?;
        if let Some(document) = self.document() {
            write!(f, " ({})", document.source.display())?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ConvergencePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "Nothing declared and nothing provisioned");
        }

        writeln!(f, "Convergence Plan ({} actions):", self.actions.len())?;
        for (i, action) in self.actions.iter().enumerate() {
            writeln!(f, "  {}. {action}", i + 1)?;
        }
        Ok(())
    }
}
