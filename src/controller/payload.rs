//! Controller payload extraction.
//!
//! NSO nests per-device detail under predictable keys in both dry-run and
//! error responses. This module pulls that detail out so reports can show
//! what each device would change or why it refused.

use serde::{Deserialize, Serialize};

/// The change one device would apply, as rendered by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceChange {
    /// Device name.
    pub name: String,
    /// Native configuration snippet.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
struct DryRunEnvelope {
    #[serde(rename = "dryrun-result")]
    result: DryRunResult,
}

#[derive(Debug, Deserialize)]
struct DryRunResult {
    #[serde(default)]
    native: Option<DeviceList>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceList {
    #[serde(default)]
    device: OneOrMany<DeviceChange>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "errors", alias = "ietf-restconf:errors")]
    errors: ErrorList,
}

#[derive(Debug, Deserialize)]
struct ErrorList {
    #[serde(default)]
    error: OneOrMany<RestconfError>,
}

#[derive(Debug, Deserialize)]
struct RestconfError {
    #[serde(rename = "error-tag")]
    tag: Option<String>,
    #[serde(rename = "error-message")]
    message: Option<String>,
    #[serde(rename = "error-path")]
    path: Option<String>,
    #[serde(default)]
    device: OneOrMany<DeviceChange>,
}

/// NSO renders single-element lists as bare objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Extracts the per-device change set from a dry-run response.
///
/// Returns `None` if the body is not a dry-run result.
#[must_use]
pub fn extract_dry_run(body: &str) -> Option<Vec<DeviceChange>> {
    let envelope: DryRunEnvelope = serde_json::from_str(body).ok()?;
    Some(
        envelope
            .result
            .native
            .unwrap_or_default()
            .device
            .into_vec(),
    )
}

/// Extracts a readable diagnostic from a RESTCONF error response.
///
/// Returns `None` if the body carries no structured errors.
#[must_use]
pub fn extract_errors(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;

    let lines: Vec<String> = envelope
        .errors
        .error
        .into_vec()
        .into_iter()
        .map(|error| {
            let devices = error.device.into_vec();
            if !devices.is_empty() {
                return render_devices(&devices);
            }
            let mut line = match (error.tag, error.message) {
                (Some(tag), Some(message)) => format!("{tag}: {message}"),
                (Some(text), None) | (None, Some(text)) => text,
                (None, None) => String::from("unspecified error"),
            };
            if let Some(path) = error.path {
                line.push_str(&format!(" (at {path})"));
            }
            line
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Renders device changes as `Device: <name>:` blocks.
#[must_use]
pub fn render_devices(devices: &[DeviceChange]) -> String {
    devices
        .iter()
        .map(|d| format!("Device: {}:\n{}", d.name, d.data.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dry_run_devices() {
        let body = r#"{
            "dryrun-result": {
                "native": {
                    "device": [
                        {"name": "pe1", "data": "interface Gi0/1\n encapsulation dot1q 100\n"},
                        {"name": "pe2", "data": "l2vpn xconnect group acme\n"}
                    ]
                }
            }
        }"#;

        let devices = extract_dry_run(body).expect("dry-run result");
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "pe1");

        let rendered = render_devices(&devices);
        assert!(rendered.starts_with("Device: pe1:\ninterface Gi0/1"));
        assert!(rendered.contains("Device: pe2:\nl2vpn xconnect group acme"));
    }

    #[test]
    fn test_extract_dry_run_without_changes() {
        let devices = extract_dry_run(r#"{"dryrun-result": {}}"#).expect("dry-run result");
        assert!(devices.is_empty());
    }

    #[test]
    fn test_extract_dry_run_single_device_object() {
        let body = r#"{"dryrun-result": {"native": {"device": {"name": "pe1", "data": "x"}}}}"#;
        let devices = extract_dry_run(body).expect("dry-run result");
        assert_eq!(devices, vec![DeviceChange { name: String::from("pe1"), data: String::from("x") }]);
    }

    #[test]
    fn test_extract_dry_run_rejects_other_bodies() {
        assert!(extract_dry_run("").is_none());
        assert!(extract_dry_run("<html>oops</html>").is_none());
        assert!(extract_dry_run(r#"{"errors": {}}"#).is_none());
    }

    #[test]
    fn test_extract_standard_errors() {
        let body = r#"{
            "ietf-restconf:errors": {
                "error": [{
                    "error-type": "application",
                    "error-tag": "malformed-message",
                    "error-path": "/l2vpn:l2vpn",
                    "error-message": "unknown element: vlann"
                }]
            }
        }"#;

        let detail = extract_errors(body).expect("errors");
        assert_eq!(
            detail,
            "malformed-message: unknown element: vlann (at /l2vpn:l2vpn)"
        );
    }

    #[test]
    fn test_extract_device_errors() {
        let body = r#"{
            "errors": {
                "error": {
                    "error-message": "device failure",
                    "device": [{"name": "pe1", "data": "% Invalid input"}]
                }
            }
        }"#;

        let detail = extract_errors(body).expect("errors");
        assert_eq!(detail, "Device: pe1:\n% Invalid input");
    }

    #[test]
    fn test_extract_errors_unstructured() {
        assert!(extract_errors("Internal Server Error").is_none());
        assert!(extract_errors(r#"{"errors": {"error": []}}"#).is_none());
    }
}
