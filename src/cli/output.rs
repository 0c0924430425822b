//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ProvisionConfig, ValidationResult};
use crate::planner::{ActionKind, ConvergenceAction, RunMode};
use crate::reconciler::PreparedRun;
use crate::report::{ConvergenceReport, ConvergenceResult, RejectedDocument};
use crate::service::LoadOutcome;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Plan action row for table display.
#[derive(Tabled)]
struct PlanActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Document")]
    document: String,
    #[tabled(rename = "Digest")]
    digest: String,
}

/// Result row for table display.
#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "HTTP")]
    http: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Declared document row for table display.
#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Document")]
    document: String,
    #[tabled(rename = "Digest")]
    digest: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a validation outcome for display.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &ProvisionConfig,
        validation: &ValidationResult,
        loaded: &LoadOutcome,
    ) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ValidationJson::new(config, validation, loaded))
                    .unwrap_or_default()
            }
            OutputFormat::Text => Self::format_validation_text(config, validation, loaded),
        }
    }

    /// Formats a validation outcome as text.
    fn format_validation_text(
        config: &ProvisionConfig,
        validation: &ValidationResult,
        loaded: &LoadOutcome,
    ) -> String {
        let mut output = String::new();

        if loaded.rejected.is_empty() {
            let _ = writeln!(output, "{} Configuration and documents are valid", "✓".green());
        } else {
            let _ = writeln!(
                output,
                "{} Configuration is valid, {} document(s) rejected",
                "✗".red(),
                loaded.rejected.len()
            );
        }

        let _ = writeln!(output, "\n   Service: {}", config.service.resource_name());
        let _ = writeln!(output, "   Controller: {}", config.controller.url);
        let _ = writeln!(
            output,
            "   Documents: {}\n",
            config.service.documents_dir.display()
        );

        if loaded.declared.is_empty() {
            output.push_str("   No customers declared.\n");
        } else {
            let rows: Vec<DocumentRow> = loaded
                .declared
                .iter()
                .map(|d| DocumentRow {
                    customer: d.customer.to_string(),
                    document: d.source.display().to_string(),
                    digest: d.short_digest().to_string(),
                })
                .collect();
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        if !validation.warnings.is_empty() {
            let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
            for warning in &validation.warnings {
                let _ = writeln!(output, "   - {warning}");
            }
        }

        Self::write_rejected(
            &mut output,
            &loaded
                .rejected
                .iter()
                .map(RejectedDocument::from)
                .collect::<Vec<_>>(),
        );

        output
    }

    /// Formats the actions a run would issue.
    #[must_use]
    pub fn format_plan(&self, service: &str, prepared: &PreparedRun) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&PlanJson::new(service, prepared)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_plan_text(service, prepared),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(service: &str, prepared: &PreparedRun) -> String {
        let plan = &prepared.plan;
        let mut output = String::new();

        let _ = write!(output, "\nConvergence plan for {service}\n");
        let _ = write!(
            output,
            "   {} declared, {} provisioned\n\n",
            prepared.loaded.declared.len(),
            prepared.observed.len()
        );

        if plan.is_empty() {
            let _ = writeln!(
                output,
                "{} Nothing declared and nothing provisioned.",
                "✓".green()
            );
        } else {
            let rows: Vec<PlanActionRow> = plan
                .actions
                .iter()
                .enumerate()
                .map(|(i, a)| PlanActionRow {
                    index: i + 1,
                    action: Self::format_action_kind(a.kind()),
                    customer: a.customer().to_string(),
                    document: a
                        .document()
                        .map_or_else(String::new, |d| d.source.display().to_string()),
                    digest: a
                        .document()
                        .map_or_else(String::new, |d| d.short_digest().to_string()),
                })
                .collect();
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');

            let _ = write!(
                output,
                "\nPlan: {} to upsert, {} to remove\n",
                plan.upsert_count().to_string().green(),
                plan.remove_count().to_string().red()
            );
        }

        Self::write_rejected(
            &mut output,
            &prepared
                .loaded
                .rejected
                .iter()
                .map(RejectedDocument::from)
                .collect::<Vec<_>>(),
        );

        output
    }

    /// Formats a convergence report.
    #[must_use]
    pub fn format_report(&self, report: &ConvergenceReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &ConvergenceReport) -> String {
        let mut output = String::new();

        let _ = write!(
            output,
            "\nRun {} ({}) on {}\n\n",
            report.run_id, report.mode, report.service
        );

        if report.results.is_empty() {
            output.push_str("   No actions were needed.\n");
        } else {
            let rows: Vec<ResultRow> = report
                .results
                .iter()
                .map(|r| ResultRow {
                    status: Self::format_status(r),
                    action: Self::format_action_kind(r.action),
                    customer: r.customer.to_string(),
                    http: r.status.map_or_else(|| String::from("-"), |s| s.to_string()),
                    detail: Self::truncate(r.detail.lines().next().unwrap_or(""), 60),
                })
                .collect();
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        // Full device change sets of successful previews
        if report.mode == RunMode::DryRun {
            for result in report.results.iter().filter(|r| r.is_success()) {
                if result.detail.lines().count() > 1 {
                    let _ = write!(
                        output,
                        "\n{} {}:\n",
                        Self::format_action_kind(result.action),
                        result.customer
                    );
                    for line in result.detail.lines() {
                        let _ = writeln!(output, "   {line}");
                    }
                }
            }
        }

        let failures: Vec<&ConvergenceResult> = report.failures().collect();
        if !failures.is_empty() {
            let _ = write!(output, "\n{} Failures:\n", "✗".red());
            for failure in failures {
                let _ = writeln!(
                    output,
                    "   - {} {}: {}",
                    failure.action, failure.customer, failure.detail
                );
            }
        }

        Self::write_rejected(&mut output, &report.rejected);

        let _ = write!(
            output,
            "\nSummary: {} applied, {} previewed, {} failed, {} rejected\n",
            report.applied_count().to_string().green(),
            report.previewed_count().to_string().cyan(),
            report.failed_count().to_string().red(),
            report.rejected.len().to_string().yellow()
        );

        output
    }

    /// Appends the rejected documents, if any.
    fn write_rejected(output: &mut String, rejected: &[RejectedDocument]) {
        if rejected.is_empty() {
            return;
        }

        let _ = write!(output, "\n{} Rejected documents:\n", "⚠".yellow());
        for document in rejected {
            let _ = writeln!(output, "   - {}", document.reason);
        }
    }

    /// Formats an action kind with color.
    fn format_action_kind(kind: ActionKind) -> String {
        match kind {
            ActionKind::Upsert => "~upsert".green().to_string(),
            ActionKind::Remove => "-remove".red().to_string(),
        }
    }

    /// Formats a result status with color.
    fn format_status(result: &ConvergenceResult) -> String {
        let label = result.status_label();
        match label {
            "applied" => label.green().to_string(),
            "previewed" => label.cyan().to_string(),
            _ => label.red().to_string(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct ValidationJson {
    valid: bool,
    service: String,
    controller: String,
    customers: Vec<DocumentJson>,
    warnings: Vec<String>,
    rejected: Vec<RejectedDocument>,
}

#[derive(Serialize)]
struct DocumentJson {
    customer: String,
    source: String,
    digest: String,
}

impl ValidationJson {
    fn new(config: &ProvisionConfig, validation: &ValidationResult, loaded: &LoadOutcome) -> Self {
        Self {
            valid: validation.is_valid() && loaded.rejected.is_empty(),
            service: config.service.resource_name(),
            controller: config.controller.url.clone(),
            customers: loaded
                .declared
                .iter()
                .map(|d| DocumentJson {
                    customer: d.customer.to_string(),
                    source: d.source.display().to_string(),
                    digest: d.digest.clone(),
                })
                .collect(),
            warnings: validation.warnings.clone(),
            rejected: loaded.rejected.iter().map(RejectedDocument::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct PlanJson {
    service: String,
    declared: usize,
    observed: Vec<String>,
    upserts: usize,
    removes: usize,
    actions: Vec<ActionJson>,
    rejected: Vec<RejectedDocument>,
}

#[derive(Serialize)]
struct ActionJson {
    action: ActionKind,
    customer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
}

impl PlanJson {
    fn new(service: &str, prepared: &PreparedRun) -> Self {
        Self {
            service: service.to_string(),
            declared: prepared.loaded.declared.len(),
            observed: prepared.observed.iter().map(ToString::to_string).collect(),
            upserts: prepared.plan.upsert_count(),
            removes: prepared.plan.remove_count(),
            actions: prepared.plan.actions.iter().map(ActionJson::from).collect(),
            rejected: prepared
                .loaded
                .rejected
                .iter()
                .map(RejectedDocument::from)
                .collect(),
        }
    }
}

impl From<&ConvergenceAction> for ActionJson {
    fn from(action: &ConvergenceAction) -> Self {
        Self {
            action: action.kind(),
            customer: action.customer().to_string(),
            source: action.document().map(|d| d.source.display().to_string()),
            digest: action.document().map(|d| d.digest.clone()),
        }
    }
}
