//! Reconciler for converging the controller to the declared services.
//!
//! This module implements one complete reconciliation pass: snapshot the
//! customers the controller knows, load the declared documents, compute
//! the diff, and drive every action in order. A pass is best-effort: a
//! failed action is recorded and the next one is attempted. Only a failure
//! to fetch the observed set aborts, since no diff exists without it.

use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::ProvisionConfig;
use crate::controller::RemoteStateClient;
use crate::error::{ReconcileError, Result};
use crate::planner::{ActionExecutor, ConvergencePlan, DiffEngine, RunMode};
use crate::report::ConvergenceReport;
use crate::service::{DeclaredSetLoader, LoadOutcome, ObservedSet};

/// Reconciler for one service.
pub struct Reconciler<'a, C: RemoteStateClient + ?Sized> {
    /// Configuration.
    config: &'a ProvisionConfig,
    /// Controller client.
    client: &'a C,
    /// Diff engine.
    diff_engine: DiffEngine,
}

/// Everything computed before the first write of a run.
#[derive(Debug)]
pub struct PreparedRun {
    /// Customers the controller knew at snapshot time.
    pub observed: ObservedSet,
    /// Declared documents and rejected files.
    pub loaded: LoadOutcome,
    /// Actions to execute.
    pub plan: ConvergencePlan,
}

impl<'a, C: RemoteStateClient + ?Sized> Reconciler<'a, C> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(config: &'a ProvisionConfig, client: &'a C) -> Self {
        Self {
            config,
            client,
            diff_engine: DiffEngine::new(),
        }
    }

    /// Fetches the observed set, loads the declared set and computes the plan.
    ///
    /// No write is issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the observed set cannot be fetched or the
    /// documents directory cannot be listed.
    pub async fn prepare(&self) -> Result<PreparedRun> {
        let service = self.config.service.resource_name();

        let observed = self.client.list_customers().await.map_err(|source| {
            ReconcileError::ObservedFetchFailed {
                service: service.clone(),
                source,
            }
        })?;
        debug!("Provisioned customers: {}", observed.len());

        let loaded = DeclaredSetLoader::new(&self.config.service).load()?;
        if !loaded.rejected.is_empty() {
            warn!(
                "{} service documents rejected; they are neither written nor deleted",
                loaded.rejected.len()
            );
        }

        let plan = self.diff_engine.plan(&loaded.declared, &observed);
        info!(
            "Plan for {service}: {} upserts, {} removals",
            plan.upsert_count(),
            plan.remove_count()
        );

        Ok(PreparedRun {
            observed,
            loaded,
            plan,
        })
    }

    /// Performs a full reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pass could not start; individual action
    /// failures are recorded in the report.
    pub async fn run(&self, mode: RunMode) -> Result<ConvergenceReport> {
        let report = ConvergenceReport::new(self.config.service.resource_name(), mode);
        let span = info_span!("run", run_id = %report.run_id, %mode);

        self.execute(report, mode).instrument(span).await
    }

    /// Drives every planned action and fills in the report.
    async fn execute(
        &self,
        mut report: ConvergenceReport,
        mode: RunMode,
    ) -> Result<ConvergenceReport> {
        info!("Starting {mode} reconciliation of {}", report.service);

        let prepared = self.prepare().await?;
        report.observed = prepared.observed.len();
        report.declared = prepared.loaded.declared.len();
        report.record_rejected(&prepared.loaded.rejected);

        let executor = ActionExecutor::new(self.client);
        for action in &prepared.plan.actions {
            let result = executor.apply_action(action, mode).await;
            report.push(result);
        }

        report.finish();
        info!(
            "Reconciliation finished: {} applied, {} previewed, {} failed",
            report.applied_count(),
            report.previewed_count(),
            report.failed_count()
        );

        Ok(report)
    }
}
