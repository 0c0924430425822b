//! Error types for the provisioning system.
//!
//! This module provides the error hierarchy for every stage of a run:
//! configuration, declared document loading, controller communication,
//! and reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the provisioning system.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Declared document errors.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Controller communication errors.
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Errors scoped to a single declared service document.
///
/// A document that fails to load is excluded from the declared set; the
/// run continues with its siblings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The document could not be read from disk.
    #[error("Failed to read {path}: {message}")]
    Read {
        /// Path of the document.
        path: PathBuf,
        /// Underlying IO error.
        message: String,
    },

    /// The document is not valid YAML.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Path of the document.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The document body is not a mapping.
    #[error("Service document {path} is not a mapping")]
    NotAMapping {
        /// Path of the document.
        path: PathBuf,
    },

    /// No customer identifier could be extracted.
    #[error("No customer service data found in {path}: missing or empty '{field}'")]
    MissingIdentifier {
        /// Path of the document.
        path: PathBuf,
        /// The identifier field that was looked up.
        field: String,
    },

    /// Another document already declared the same customer.
    #[error("Customer '{customer}' in {path} is already declared by {first}")]
    DuplicateCustomer {
        /// Path of the rejected document.
        path: PathBuf,
        /// The duplicated customer identifier.
        customer: String,
        /// Path of the document that declared it first.
        first: PathBuf,
    },
}

/// Errors communicating with the remote controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller could not be reached.
    #[error("Transport failure talking to controller: {message}")]
    Transport {
        /// Description of the network error.
        message: String,
    },

    /// The controller answered with a non-success status.
    #[error("Controller returned {status}: {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("Invalid response from controller: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// A resource URL could not be built.
    #[error("Invalid controller URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The observed customer set could not be fetched, so no diff can be computed.
    #[error("Failed to fetch provisioned customers for {service}: {source}")]
    ObservedFetchFailed {
        /// Service resource name.
        service: String,
        /// Underlying controller failure.
        #[source]
        source: ControllerError,
    },
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;

impl ProvisionError {
    /// Returns true if this error is a network-level failure.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Controller(ControllerError::Transport { .. })
                | Self::Reconcile(ReconcileError::ObservedFetchFailed {
                    source: ControllerError::Transport { .. },
                    ..
                })
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl LoadError {
    /// Returns the path of the document this error refers to.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::NotAMapping { path }
            | Self::MissingIdentifier { path, .. }
            | Self::DuplicateCustomer { path, .. } => path,
        }
    }
}

impl ControllerError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a remote status error.
    #[must_use]
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let direct = ProvisionError::from(ControllerError::transport("connection refused"));
        assert!(direct.is_transport());

        let wrapped = ProvisionError::from(ReconcileError::ObservedFetchFailed {
            service: String::from("l2vpn:l2vpn"),
            source: ControllerError::transport("tls handshake"),
        });
        assert!(wrapped.is_transport());

        let remote = ProvisionError::from(ControllerError::remote(500, "boom"));
        assert!(!remote.is_transport());
    }

    #[test]
    fn test_provision_error_names_its_layer() {
        let io = ProvisionError::from(std::io::Error::other("broken pipe"));
        assert_eq!(io.to_string(), "IO error: broken pipe");

        let controller = ProvisionError::from(ControllerError::remote(503, "busy"));
        assert!(controller.to_string().starts_with("Controller error: "));
        assert!(!controller.is_transport());
    }

    #[test]
    fn test_load_error_path() {
        let err = LoadError::MissingIdentifier {
            path: PathBuf::from("svc/acme.yaml"),
            field: String::from("l2vpn"),
        };
        assert_eq!(err.path(), &PathBuf::from("svc/acme.yaml"));
        assert!(err.to_string().contains("missing or empty 'l2vpn'"));
    }
}
