//! RESTCONF client implementation.
//!
//! This module talks to the controller's RESTCONF data tree over HTTP with
//! basic authentication. It knows how to address the service list and its
//! entries, and nothing about what a response means for convergence.

use async_trait::async_trait;
use reqwest::{header, Client, Method, Url};
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::{ControllerConfig, ServiceConfig};
use crate::error::{ConfigError, ControllerError, ProvisionError, Result};
use crate::service::{CustomerId, ObservedSet, ServiceDocument};

use super::client::{ControllerResult, RemoteOutcome, RemoteStateClient, STATUS_NOT_FOUND};
use super::payload;

/// Media type for YANG-modelled JSON.
const YANG_JSON: &str = "application/yang-data+json";

/// Query parameter asking the controller to simulate a change.
const DRY_RUN_PARAM: &str = "dryrun";

/// Output format requested for dry runs (per-device native config).
const DRY_RUN_FORMAT: &str = "native";

/// The fixed set of requests issued against the data tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read the whole service list.
    List,
    /// Full-replace write of one entry.
    Replace,
    /// Delete one entry.
    Delete,
}

impl Operation {
    /// Returns the HTTP method for this operation.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::List => Method::GET,
            Self::Replace => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::Replace => "replace",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// RESTCONF client bound to one service list.
#[derive(Debug, Clone)]
pub struct RestconfClient {
    /// HTTP client.
    client: Client,
    /// Controller base URL.
    base_url: Url,
    /// Basic auth username.
    username: String,
    /// Basic auth password.
    password: String,
    /// Resource name of the service list (`module:list`).
    resource: String,
    /// Identifier leaf inside each list entry.
    identifier_field: String,
}

impl RestconfClient {
    /// Creates a new RESTCONF client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, no password is configured,
    /// or the HTTP client cannot be created.
    pub fn new(controller: &ControllerConfig, service: &ServiceConfig) -> Result<Self> {
        let base_url = Url::parse(&controller.url).map_err(|_| ControllerError::InvalidUrl {
            url: controller.url.clone(),
        })?;

        let password = controller.password.clone().ok_or_else(|| {
            ProvisionError::Config(ConfigError::MissingEnvVar {
                name: String::from(crate::config::ENV_PASSWORD),
            })
        })?;

        let mut builder = Client::builder().danger_accept_invalid_certs(!controller.verify_tls);
        if let Some(secs) = controller.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            ControllerError::transport(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            username: controller.username.clone(),
            password,
            resource: service.resource_name(),
            identifier_field: service.identifier_field().to_string(),
        })
    }

    /// Builds the data-tree URL for the list, or for one entry of it.
    fn resource_url(&self, customer: Option<&CustomerId>, dry_run: bool) -> ControllerResult<Url> {
        let segment = customer.map_or_else(
            || self.resource.clone(),
            |c| format!("{}={}", self.resource, c),
        );

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ControllerError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(["restconf", "data", segment.as_str()]);

        if dry_run {
            url.query_pairs_mut()
                .append_pair(DRY_RUN_PARAM, DRY_RUN_FORMAT);
        }

        Ok(url)
    }

    /// Sends one request and collects status and body.
    async fn send(
        &self,
        operation: Operation,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> ControllerResult<RemoteOutcome> {
        debug!("{operation} {url}");

        let mut request = self
            .client
            .request(operation.method(), url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(header::ACCEPT, YANG_JSON)
            .header(header::CONTENT_TYPE, YANG_JSON);

        if let Some(body) = body {
            trace!("Request body: {body}");
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(|e| {
            ControllerError::transport(format!("{operation} {url} failed: {e}"))
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            ControllerError::transport(format!("Failed to read {operation} response: {e}"))
        })?;

        debug!("{operation} returned {status}");
        Ok(RemoteOutcome::new(status, text))
    }

    /// Parses the service list body into the observed set.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object, or if the service
    /// list is neither an array nor a single entry. An object without the
    /// service list means no customer is provisioned.
    pub fn parse_customers(&self, body: &str) -> ControllerResult<ObservedSet> {
        if body.trim().is_empty() {
            return Ok(ObservedSet::new());
        }

        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ControllerError::InvalidResponse {
                message: format!("Service list is not JSON: {e}"),
            })?;

        let Some(object) = value.as_object() else {
            return Err(ControllerError::InvalidResponse {
                message: String::from("Service list response is not a JSON object"),
            });
        };

        let entries = match object.get(&self.resource) {
            None => {
                debug!("Response carries no '{}' entries", self.resource);
                return Ok(ObservedSet::new());
            }
            Some(serde_json::Value::Array(entries)) => entries.as_slice(),
            Some(entry @ serde_json::Value::Object(_)) => std::slice::from_ref(entry),
            Some(_) => {
                return Err(ControllerError::InvalidResponse {
                    message: format!("'{}' is neither a list nor an entry", self.resource),
                });
            }
        };

        Ok(entries
            .iter()
            .filter_map(|entry| entry.get(&self.identifier_field))
            .filter_map(CustomerId::from_json)
            .collect())
    }
}

#[async_trait]
impl RemoteStateClient for RestconfClient {
    async fn list_customers(&self) -> ControllerResult<ObservedSet> {
        let url = self.resource_url(None, false)?;
        let outcome = self.send(Operation::List, url, None).await?;

        if outcome.status == STATUS_NOT_FOUND {
            debug!("Service {} not present on controller", self.resource);
            return Ok(ObservedSet::new());
        }

        if !outcome.is_success() {
            let message =
                payload::extract_errors(&outcome.body).unwrap_or_else(|| outcome.body.clone());
            return Err(ControllerError::remote(outcome.status, message));
        }

        self.parse_customers(&outcome.body)
    }

    async fn upsert_customer(
        &self,
        customer: &CustomerId,
        document: &ServiceDocument,
        dry_run: bool,
    ) -> ControllerResult<RemoteOutcome> {
        let url = self.resource_url(Some(customer), dry_run)?;
        self.send(Operation::Replace, url, Some(&document.payload))
            .await
    }

    async fn remove_customer(
        &self,
        customer: &CustomerId,
        dry_run: bool,
    ) -> ControllerResult<RemoteOutcome> {
        let url = self.resource_url(Some(customer), dry_run)?;
        self.send(Operation::Delete, url, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn client(url: &str) -> RestconfClient {
        let controller = ControllerConfig {
            url: url.to_string(),
            username: String::from("admin"),
            password: Some(String::from("admin")),
            verify_tls: false,
            timeout_secs: Some(5),
        };
        let service = ServiceConfig {
            path: String::from("l2vpn"),
            key: String::from("l2vpn"),
            documents_dir: PathBuf::from("."),
        };
        RestconfClient::new(&controller, &service).expect("client")
    }

    fn id(s: &str) -> CustomerId {
        CustomerId::new(s).expect("valid id")
    }

    #[test]
    fn test_list_url() {
        let url = client("https://nso:8888")
            .resource_url(None, false)
            .expect("url");
        assert_eq!(url.as_str(), "https://nso:8888/restconf/data/l2vpn:l2vpn");
    }

    #[test]
    fn test_entry_url_with_dry_run() {
        let url = client("https://nso:8888/")
            .resource_url(Some(&id("acme")), true)
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://nso:8888/restconf/data/l2vpn:l2vpn=acme?dryrun=native"
        );
    }

    #[test]
    fn test_entry_url_escapes_slash() {
        let url = client("https://nso:8888")
            .resource_url(Some(&id("a/b")), false)
            .expect("url");
        assert_eq!(url.path(), "/restconf/data/l2vpn:l2vpn=a%2Fb");
    }

    #[test]
    fn test_missing_password_rejected() {
        let controller = ControllerConfig {
            url: String::from("https://nso"),
            username: String::from("admin"),
            password: None,
            verify_tls: true,
            timeout_secs: None,
        };
        let service = ServiceConfig {
            path: String::from("l2vpn"),
            key: String::from("l2vpn"),
            documents_dir: PathBuf::from("."),
        };
        assert!(matches!(
            RestconfClient::new(&controller, &service),
            Err(ProvisionError::Config(ConfigError::MissingEnvVar { .. }))
        ));
    }

    #[test]
    fn test_parse_customers() {
        let c = client("https://nso");
        let body = r#"{"l2vpn:l2vpn": [
            {"l2vpn": "bravo", "vlan": 1},
            {"vlan": 2},
            {"l2vpn": "charlie"},
            {"l2vpn": "bravo"}
        ]}"#;

        let observed = c.parse_customers(body).expect("parsed");
        let names: Vec<&str> = observed.iter().map(CustomerId::as_str).collect();
        assert_eq!(names, vec!["bravo", "charlie"]);
    }

    #[test]
    fn test_parse_customers_empty_body() {
        assert!(client("https://nso").parse_customers("  ").expect("parsed").is_empty());
    }

    #[test]
    fn test_parse_customers_without_service_list_is_empty() {
        let c = client("https://nso");
        assert!(c.parse_customers("{}").expect("parsed").is_empty());
        assert!(c
            .parse_customers(r#"{"other:thing": []}"#)
            .expect("parsed")
            .is_empty());
    }

    #[test]
    fn test_parse_customers_unexpected_shape() {
        let c = client("https://nso");
        assert!(matches!(
            c.parse_customers(r#"{"l2vpn:l2vpn": "acme"}"#),
            Err(ControllerError::InvalidResponse { .. })
        ));
        assert!(matches!(
            c.parse_customers("[]"),
            Err(ControllerError::InvalidResponse { .. })
        ));
        assert!(matches!(
            c.parse_customers("not json"),
            Err(ControllerError::InvalidResponse { .. })
        ));
    }
}
