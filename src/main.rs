//! nso-provision CLI entrypoint.
//!
//! This is the main entrypoint for the nso-provision command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nso_provision::cli::{Cli, Commands, LogFormat, OutputFormatter};
use nso_provision::config::{find_config_file, ConfigParser, ConfigValidator, ProvisionConfig};
use nso_provision::controller::RestconfClient;
use nso_provision::error::Result;
use nso_provision::planner::RunMode;
use nso_provision::reconciler::Reconciler;
use nso_provision::service::DeclaredSetLoader;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_format);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr so stdout only ever carries command output.
/// `RUST_LOG` takes precedence over the verbosity flag.
fn init_logging(verbose: bool, format: LogFormat) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(format == LogFormat::Text)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Main async entry point.
///
/// Returns whether the command completed cleanly.
async fn run(cli: Cli) -> Result<bool> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Validate => cmd_validate(cli.config.as_ref(), &formatter),
        Commands::Diff => cmd_diff(cli.config.as_ref(), &formatter).await,
        Commands::Plan => cmd_plan(cli.config.as_ref(), &formatter).await,
        Commands::Apply { yes } => cmd_apply(cli.config.as_ref(), yes, &formatter).await,
    }
}

/// Validate configuration and service documents.
fn cmd_validate(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<bool> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(config_dir(&config_file));
    parser.load_dotenv()?;

    // Credentials are not needed without network access
    let config = parser.load_file(&config_file)?;
    let validation = ConfigValidator::new().validate(&config)?;

    let loaded = DeclaredSetLoader::new(&config.service).load()?;

    let output = formatter.format_validation(&config, &validation, &loaded);
    emit(&output)?;

    Ok(loaded.rejected.is_empty())
}

/// Show the actions a run would issue.
async fn cmd_diff(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<bool> {
    let config = load_config(config_path)?;
    let client = RestconfClient::new(&config.controller, &config.service)?;

    let prepared = Reconciler::new(&config, &client).prepare().await?;

    let output = formatter.format_plan(&config.service.resource_name(), &prepared);
    emit(&output)?;

    Ok(prepared.loaded.rejected.is_empty())
}

/// Preview every action with the controller's dry run.
async fn cmd_plan(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<bool> {
    let config = load_config(config_path)?;
    let client = RestconfClient::new(&config.controller, &config.service)?;

    let report = Reconciler::new(&config, &client).run(RunMode::DryRun).await?;

    let output = formatter.format_report(&report);
    emit(&output)?;

    Ok(report.is_clean())
}

/// Apply every action to the controller.
async fn cmd_apply(
    config_path: Option<&PathBuf>,
    auto_approve: bool,
    formatter: &OutputFormatter,
) -> Result<bool> {
    let config = load_config(config_path)?;
    let client = RestconfClient::new(&config.controller, &config.service)?;

    // Confirm
    if !auto_approve {
        eprint!(
            "This will converge {} on {} to the declared documents. Continue? [y/N]: ",
            config.service.resource_name(),
            config.controller.url
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Apply cancelled.");
            return Ok(true);
        }
    }

    let report = Reconciler::new(&config, &client).run(RunMode::Apply).await?;

    let output = formatter.format_report(&report);
    emit(&output)?;

    Ok(report.is_clean())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Returns the directory holding the configuration file.
fn config_dir(config_file: &Path) -> &Path {
    config_file.parent().unwrap_or_else(|| Path::new("."))
}

/// Loads, overrides from the environment, and validates the configuration.
fn load_config(config_path: Option<&PathBuf>) -> Result<ProvisionConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(config_dir(&config_file));
    parser.load_dotenv()?;

    let config = parser.load_with_env(&config_file)?;

    let validation = ConfigValidator::new().validate(&config)?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    Ok(config)
}
