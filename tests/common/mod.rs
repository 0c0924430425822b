//! Shared fixtures for integration tests.

use std::path::Path;

use nso_provision::config::{ControllerConfig, ProvisionConfig, ServiceConfig};
use tempfile::TempDir;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "s3cret";

/// Builds a configuration pointing at `url` and reading documents from `dir`.
pub fn config(url: &str, dir: &Path) -> ProvisionConfig {
    ProvisionConfig {
        controller: ControllerConfig {
            url: url.to_string(),
            username: USERNAME.to_string(),
            password: Some(PASSWORD.to_string()),
            verify_tls: false,
            timeout_secs: Some(5),
        },
        service: ServiceConfig {
            path: String::from("l2vpn"),
            key: String::from("l2vpn"),
            documents_dir: dir.to_path_buf(),
        },
    }
}

/// Writes one `<name>.yaml` document per customer.
pub fn documents(names: &[&str]) -> TempDir {
    let temp = TempDir::new().expect("temp dir");
    for name in names {
        std::fs::write(
            temp.path().join(format!("{name}.yaml")),
            format!("l2vpn: {name}\nvlan: 100\n"),
        )
        .expect("write document");
    }
    temp
}
