//! Diff engine for comparing declared vs observed customers.
//!
//! Every declared customer is upserted, whether or not the controller
//! already knows it; the controller's full-replace write makes that
//! idempotent. Only observed customers missing from the declared set are
//! removed, and removals always come after every upsert.

use tracing::debug;

use crate::service::{DeclaredSet, ObservedSet};

use super::plan::{ConvergenceAction, ConvergencePlan};

/// Engine for computing convergence actions.
#[derive(Debug, Default)]
pub struct DiffEngine;

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the ordered action sequence for a declared and observed set.
    ///
    /// Upserts follow the declared set's load order; removals follow the
    /// observed set's enumeration order.
    #[must_use]
    pub fn compute_diff(
        &self,
        declared: &DeclaredSet,
        observed: &ObservedSet,
    ) -> Vec<ConvergenceAction> {
        let upserts = declared
            .iter()
            .map(|document| ConvergenceAction::Upsert(document.customer.clone(), document.clone()));

        let removes = observed
            .iter()
            .filter(|customer| !declared.contains(customer))
            .map(|customer| ConvergenceAction::Remove(customer.clone()));

        let actions: Vec<ConvergenceAction> = upserts.chain(removes).collect();

        debug!(
            "Diff: {} declared, {} observed, {} actions",
            declared.len(),
            observed.len(),
            actions.len()
        );

        actions
    }

    /// Computes the diff and wraps it in a plan.
    #[must_use]
    pub fn plan(&self, declared: &DeclaredSet, observed: &ObservedSet) -> ConvergencePlan {
        ConvergencePlan::new(self.compute_diff(declared, observed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ActionKind;
    use crate::service::{CustomerId, ServiceDocument};
    use serde_json::json;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn id(s: &str) -> CustomerId {
        CustomerId::new(s).expect("valid id")
    }

    fn declared(names: &[&str]) -> DeclaredSet {
        let mut set = DeclaredSet::new();
        for name in names {
            set.insert(ServiceDocument {
                customer: id(name),
                source: PathBuf::from(format!("{name}.yaml")),
                payload: json!({"l2vpn:l2vpn": {"l2vpn": name}}),
                digest: format!("digest-{name}"),
            })
            .expect("unique");
        }
        set
    }

    fn observed(names: &[&str]) -> ObservedSet {
        names.iter().map(|n| id(n)).collect()
    }

    fn summary(actions: &[ConvergenceAction]) -> Vec<(ActionKind, &str)> {
        actions
            .iter()
            .map(|a| (a.kind(), a.customer().as_str()))
            .collect()
    }

    #[test]
    fn test_upserts_all_declared_and_removes_stale() {
        let actions = DiffEngine::new().compute_diff(&declared(&["A", "B"]), &observed(&["B", "C"]));

        assert_eq!(
            summary(&actions),
            vec![
                (ActionKind::Upsert, "A"),
                (ActionKind::Upsert, "B"),
                (ActionKind::Remove, "C"),
            ]
        );
    }

    #[test]
    fn test_empty_observed_only_upserts() {
        let actions = DiffEngine::new().compute_diff(&declared(&["A"]), &ObservedSet::new());
        assert_eq!(summary(&actions), vec![(ActionKind::Upsert, "A")]);
    }

    #[test]
    fn test_empty_declared_removes_everything_in_order() {
        let actions = DiffEngine::new().compute_diff(&DeclaredSet::new(), &observed(&["Z", "X", "Y"]));
        assert_eq!(
            summary(&actions),
            vec![
                (ActionKind::Remove, "Z"),
                (ActionKind::Remove, "X"),
                (ActionKind::Remove, "Y"),
            ]
        );
    }

    #[test]
    fn test_upsert_carries_declared_document() {
        let set = declared(&["A"]);
        let actions = DiffEngine::new().compute_diff(&set, &observed(&["A"]));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].document(), set.get(&id("A")));
    }

    #[test]
    fn test_diff_is_deterministic() {
        let d = declared(&["m", "a", "q"]);
        let o = observed(&["x", "a", "b"]);
        let engine = DiffEngine::new();
        assert_eq!(engine.compute_diff(&d, &o), engine.compute_diff(&d, &o));
    }

    #[test]
    fn test_diff_properties_over_overlapping_sets() {
        let universe = ["a", "b", "c", "d", "e", "f"];
        let engine = DiffEngine::new();

        // Every split of the universe into declared/observed membership.
        for mask in 0u32..(1 << (2 * universe.len())) {
            let d_names: Vec<&str> = universe
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, n)| *n)
                .collect();
            let o_names: Vec<&str> = universe
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << (i + universe.len())) != 0)
                .map(|(_, n)| *n)
                .collect();

            let actions = engine.compute_diff(&declared(&d_names), &observed(&o_names));

            let upserts: Vec<&str> = actions
                .iter()
                .filter(|a| a.kind() == ActionKind::Upsert)
                .map(|a| a.customer().as_str())
                .collect();
            let removes: HashSet<&str> = actions
                .iter()
                .filter(|a| a.kind() == ActionKind::Remove)
                .map(|a| a.customer().as_str())
                .collect();
            let expected_removes: HashSet<&str> = o_names
                .iter()
                .copied()
                .filter(|n| !d_names.contains(n))
                .collect();

            assert_eq!(upserts, d_names);
            assert_eq!(removes, expected_removes);
            assert_eq!(actions.len(), d_names.len() + expected_removes.len());

            let first_remove = actions
                .iter()
                .position(|a| a.kind() == ActionKind::Remove)
                .unwrap_or(actions.len());
            assert!(actions[first_remove..]
                .iter()
                .all(|a| a.kind() == ActionKind::Remove));
        }
    }

    #[test]
    fn test_plan_counts() {
        let plan = DiffEngine::new().plan(&declared(&["A", "B"]), &observed(&["B", "C", "D"]));
        assert_eq!(plan.upsert_count(), 2);
        assert_eq!(plan.remove_count(), 2);
        assert!(!plan.is_empty());
    }
}
