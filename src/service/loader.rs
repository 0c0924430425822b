//! Declared set loader.
//!
//! This module reads the per-customer service documents from disk and
//! builds the declared set for one reconciliation run. Malformed documents
//! are rejected individually; they never abort the load.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::ServiceConfig;
use crate::error::{LoadError, Result};

use super::hash::DocumentHasher;
use super::types::{CustomerId, DeclaredSet, ServiceDocument};

/// File extensions recognized as service documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Loader for the locally declared customer service documents.
#[derive(Debug)]
pub struct DeclaredSetLoader<'a> {
    /// Service settings (resource name, identifier field, directory).
    service: &'a ServiceConfig,
    /// Document hasher.
    hasher: DocumentHasher,
}

/// Result of loading the declared set.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Successfully loaded documents, keyed by customer.
    pub declared: DeclaredSet,
    /// Documents that were rejected, in file order.
    pub rejected: Vec<LoadError>,
}

impl<'a> DeclaredSetLoader<'a> {
    /// Creates a new loader for the given service.
    #[must_use]
    pub const fn new(service: &'a ServiceConfig) -> Self {
        Self {
            service,
            hasher: DocumentHasher::new(),
        }
    }

    /// Loads every document in the service's documents directory.
    ///
    /// Documents are processed in file-name order, which is the order
    /// their upserts are later issued in.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory itself cannot be listed.
    pub fn load(&self) -> Result<LoadOutcome> {
        let dir = &self.service.documents_dir;
        info!("Loading service documents from: {}", dir.display());

        let mut outcome = LoadOutcome::default();

        for path in Self::document_paths(dir)? {
            debug!("Processing file {}", path.display());

            let document = match self.load_document(&path) {
                Ok(document) => document,
                Err(e) => {
                    error!("{e}");
                    outcome.rejected.push(e);
                    continue;
                }
            };

            let customer = document.customer.clone();
            if let Err(first) = outcome.declared.insert(document) {
                let e = LoadError::DuplicateCustomer {
                    path,
                    customer: customer.to_string(),
                    first,
                };
                error!("{e}");
                outcome.rejected.push(e);
            }
        }

        info!(
            "Loaded {} customer documents ({} rejected)",
            outcome.declared.len(),
            outcome.rejected.len()
        );
        Ok(outcome)
    }

    /// Lists document files in a directory, sorted by file name.
    fn document_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_document = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e));
            if is_document {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Loads and validates a single document file.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read, is not a YAML
    /// mapping, or does not carry a customer identifier.
    pub fn load_document(&self, path: &Path) -> std::result::Result<ServiceDocument, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let body: serde_json::Value =
            serde_yaml::from_str(&content).map_err(|e| LoadError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        self.build_document(body, path)
    }

    /// Wraps a document body under the resource name and extracts its customer.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the body is not a mapping or lacks a
    /// usable identifier.
    pub fn build_document(
        &self,
        body: serde_json::Value,
        path: &Path,
    ) -> std::result::Result<ServiceDocument, LoadError> {
        if !body.is_object() {
            return Err(LoadError::NotAMapping {
                path: path.to_path_buf(),
            });
        }

        let field = self.service.identifier_field();
        let customer = body
            .get(field)
            .and_then(CustomerId::from_json)
            .ok_or_else(|| LoadError::MissingIdentifier {
                path: path.to_path_buf(),
                field: field.to_string(),
            })?;

        let mut payload = serde_json::Map::new();
        payload.insert(self.service.resource_name(), body);
        let payload = serde_json::Value::Object(payload);
        let digest = self.hasher.digest(&payload);

        Ok(ServiceDocument {
            customer,
            source: path.to_path_buf(),
            payload,
            digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn service(dir: &Path) -> ServiceConfig {
        ServiceConfig {
            path: String::from("l2vpn"),
            key: String::from("l2vpn"),
            documents_dir: dir.to_path_buf(),
        }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).expect("write document");
    }

    #[test]
    fn test_build_document_wraps_payload() {
        let svc = service(Path::new("."));
        let loader = DeclaredSetLoader::new(&svc);

        let document = loader
            .build_document(json!({"l2vpn": "acme", "vlan": 100}), Path::new("acme.yaml"))
            .expect("valid document");

        assert_eq!(document.customer.as_str(), "acme");
        assert_eq!(
            document.payload,
            json!({"l2vpn:l2vpn": {"l2vpn": "acme", "vlan": 100}})
        );
        assert_eq!(document.digest.len(), 64);
    }

    #[test]
    fn test_build_document_missing_identifier() {
        let svc = service(Path::new("."));
        let loader = DeclaredSetLoader::new(&svc);

        let result = loader.build_document(json!({"vlan": 100}), Path::new("x.yaml"));
        assert!(matches!(result, Err(LoadError::MissingIdentifier { .. })));

        let result = loader.build_document(json!({"l2vpn": ""}), Path::new("x.yaml"));
        assert!(matches!(result, Err(LoadError::MissingIdentifier { .. })));

        let result = loader.build_document(json!(["l2vpn"]), Path::new("x.yaml"));
        assert!(matches!(result, Err(LoadError::NotAMapping { .. })));
    }

    #[test]
    fn test_load_skips_malformed_and_keeps_siblings() {
        let temp = TempDir::new().expect("temp dir");
        write(temp.path(), "a.yaml", "l2vpn: alpha\nvlan: 10\n");
        write(temp.path(), "b.yaml", "vlan: 20\n");
        write(temp.path(), "c.yml", "l2vpn: gamma\nvlan: 30\n");
        write(temp.path(), "d.yaml", "l2vpn: [unterminated\n");
        write(temp.path(), "notes.txt", "l2vpn: ignored\n");

        let svc = service(temp.path());
        let outcome = DeclaredSetLoader::new(&svc).load().expect("load");

        let customers: Vec<&str> = outcome
            .declared
            .iter()
            .map(|d| d.customer.as_str())
            .collect();
        assert_eq!(customers, vec!["alpha", "gamma"]);

        assert_eq!(outcome.rejected.len(), 2);
        assert!(matches!(outcome.rejected[0], LoadError::MissingIdentifier { .. }));
        assert!(matches!(outcome.rejected[1], LoadError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_duplicate_customer() {
        let temp = TempDir::new().expect("temp dir");
        write(temp.path(), "01-acme.yaml", "l2vpn: acme\nvlan: 10\n");
        write(temp.path(), "02-acme-copy.yaml", "l2vpn: acme\nvlan: 99\n");

        let svc = service(temp.path());
        let outcome = DeclaredSetLoader::new(&svc).load().expect("load");

        assert_eq!(outcome.declared.len(), 1);
        let kept = outcome
            .declared
            .iter()
            .next()
            .expect("one document");
        assert_eq!(kept.payload["l2vpn:l2vpn"]["vlan"], json!(10));
        assert!(matches!(
            &outcome.rejected[..],
            [LoadError::DuplicateCustomer { customer, .. }] if customer == "acme"
        ));
    }

    #[test]
    fn test_load_missing_directory_is_fatal() {
        let temp = TempDir::new().expect("temp dir");
        let svc = service(&temp.path().join("nope"));
        assert!(DeclaredSetLoader::new(&svc).load().is_err());
    }
}
