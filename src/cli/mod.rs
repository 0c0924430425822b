//! CLI module for the provisioning tool.
//!
//! This module provides the command-line interface for reconciling
//! service documents against the controller.

mod commands;
mod output;

pub use commands::{Cli, Commands, LogFormat, OutputFormat};
pub use output::OutputFormatter;
