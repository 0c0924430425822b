//! Configuration specification types for the provisioning tool.
//!
//! This module defines the structs that map to `provision.yaml`. The
//! record is loaded once and passed by reference to the loader, the
//! controller client and the reconciler.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Remote controller connection settings.
    pub controller: ControllerConfig,
    /// Service definition settings.
    pub service: ServiceConfig,
}

/// Connection settings for the RESTCONF controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Base URL of the controller (e.g. `https://nso.example.net:8888`).
    pub url: String,
    /// Username for HTTP basic authentication.
    pub username: String,
    /// Password for HTTP basic authentication.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Whether to verify the controller's TLS certificate.
    #[serde(default)]
    pub verify_tls: bool,
    /// Optional client-side request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Service definition settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// YANG module of the service (first half of the resource name).
    pub path: String,
    /// Service list name, also the identifier leaf of each entry.
    pub key: String,
    /// Directory holding one declared document per customer.
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("services")
}

impl ServiceConfig {
    /// Returns the RESTCONF resource name, `"<path>:<key>"`.
    #[must_use]
    pub fn resource_name(&self) -> String {
        format!("{}:{}", self.path, self.key)
    }

    /// Returns the leaf carrying the customer identifier.
    #[must_use]
    pub fn identifier_field(&self) -> &str {
        &self.key
    }
}

impl ProvisionConfig {
    /// Resolves a relative `documents_dir` against the configuration file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.service.documents_dir.is_relative() {
            self.service.documents_dir = base.join(&self.service.documents_dir);
        }
    }
}
