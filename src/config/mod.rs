//! Configuration module for the provisioning tool.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `provision.yaml`
//! - Environment and `.env` overrides for controller credentials
//! - Validation of configuration values

mod spec;
mod parser;
mod validator;

pub use spec::{ControllerConfig, ProvisionConfig, ServiceConfig};
pub use parser::{ConfigParser, find_config_file, ENV_PASSWORD, ENV_URL, ENV_USERNAME};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
