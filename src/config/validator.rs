//! Configuration validation.
//!
//! This module checks a loaded configuration for values that would make
//! every controller request fail, before any network call is attempted.

use crate::error::{ConfigError, ProvisionError, Result};
use reqwest::Url;
use tracing::debug;

use super::spec::{ControllerConfig, ProvisionConfig, ServiceConfig};

/// Validator for provisioning configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator {
    /// Whether the documents directory must exist.
    check_filesystem: bool,
}

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator that also checks the documents directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check_filesystem: true,
        }
    }

    /// Skips filesystem checks.
    #[must_use]
    pub const fn without_filesystem_checks(mut self) -> Self {
        self.check_filesystem = false;
        self
    }

    /// Validates a provisioning configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any were found.
    pub fn validate(&self, config: &ProvisionConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_controller(&config.controller, &mut result);
        self.validate_service(&config.service, &mut result);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(ProvisionError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    /// Validates controller settings.
    fn validate_controller(controller: &ControllerConfig, result: &mut ValidationResult) {
        match Url::parse(&controller.url) {
            Ok(url) => match url.scheme() {
                "https" => {}
                "http" => result.warnings.push(String::from(
                    "controller.url uses plain http; credentials are sent unencrypted",
                )),
                other => result.errors.push(ValidationError {
                    field: String::from("controller.url"),
                    message: format!("Unsupported URL scheme '{other}', expected http or https"),
                }),
            },
            Err(e) => result.errors.push(ValidationError {
                field: String::from("controller.url"),
                message: format!("Invalid controller URL '{}': {e}", controller.url),
            }),
        }

        if controller.username.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("controller.username"),
                message: String::from("Username cannot be empty"),
            });
        }

        if !controller.verify_tls {
            result
                .warnings
                .push(String::from("TLS certificate verification is disabled"));
        }

        if controller.timeout_secs == Some(0) {
            result.errors.push(ValidationError {
                field: String::from("controller.timeout_secs"),
                message: String::from("Timeout must be at least 1 second"),
            });
        }
    }

    /// Validates service settings.
    fn validate_service(&self, service: &ServiceConfig, result: &mut ValidationResult) {
        for (field, value) in [("service.path", &service.path), ("service.key", &service.key)] {
            if !is_valid_identifier(value) {
                result.errors.push(ValidationError {
                    field: String::from(field),
                    message: format!("'{value}' is not a valid YANG identifier"),
                });
            }
        }

        if self.check_filesystem && !service.documents_dir.is_dir() {
            result.errors.push(ValidationError {
                field: String::from("service.documents_dir"),
                message: format!(
                    "Documents directory {} does not exist",
                    service.documents_dir.display()
                ),
            });
        }
    }
}

/// Checks YANG identifier syntax: a letter or underscore, then letters,
/// digits, underscores, hyphens or dots.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(url: &str) -> ProvisionConfig {
        ProvisionConfig {
            controller: ControllerConfig {
                url: url.to_string(),
                username: String::from("admin"),
                password: Some(String::from("admin")),
                verify_tls: true,
                timeout_secs: None,
            },
            service: ServiceConfig {
                path: String::from("l2vpn"),
                key: String::from("l2vpn"),
                documents_dir: PathBuf::from("does-not-matter"),
            },
        }
    }

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("l2vpn"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("tailf-ncs.v2"));
    }

    #[test]
    fn test_invalid_identifier() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2vpn"));
        assert!(!is_valid_identifier("l2vpn:l2vpn"));
        assert!(!is_valid_identifier("l2 vpn"));
    }

    #[test]
    fn test_valid_config_passes() {
        let validator = ConfigValidator::new().without_filesystem_checks();
        let result = validator
            .validate(&config("https://nso:8888"))
            .expect("valid");
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_plain_http_warns() {
        let mut cfg = config("http://nso:8080");
        cfg.controller.verify_tls = false;
        let result = ConfigValidator::new()
            .without_filesystem_checks()
            .validate(&cfg)
            .expect("valid");
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_bad_url_rejected() {
        let result = ConfigValidator::new()
            .without_filesystem_checks()
            .validate(&config("not a url"));
        assert!(matches!(
            result,
            Err(ProvisionError::Config(ConfigError::ValidationError { field: Some(ref f), .. }))
                if f == "controller.url"
        ));
    }

    #[test]
    fn test_missing_documents_dir_rejected() {
        let result = ConfigValidator::new().validate(&config("https://nso"));
        assert!(result.is_err());
    }
}
