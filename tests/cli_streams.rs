use std::process::Command;

use tempfile::TempDir;

fn workspace() -> TempDir {
    let temp = TempDir::new().expect("temp dir");
    let services = temp.path().join("services");
    std::fs::create_dir(&services).expect("services dir");
    std::fs::write(services.join("acme.yaml"), "l2vpn: acme\nvlan: 100\n").expect("document");
    std::fs::write(
        temp.path().join("provision.yaml"),
        "controller:\n  url: https://nso.example.net:8888\n  username: admin\n\
         service:\n  path: l2vpn\n  key: l2vpn\n",
    )
    .expect("config");
    temp
}

#[test]
fn test_json_output_goes_to_stdout_alone() {
    let temp = workspace();

    let output = Command::new(env!("CARGO_BIN_EXE_nso-provision"))
        .arg("--config")
        .arg(temp.path().join("provision.yaml"))
        .args(["--output", "json", "validate"])
        .env("RUST_LOG", "info")
        .output()
        .expect("binary runs");

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is pure JSON");
    assert_eq!(value["valid"], true);
    assert_eq!(value["customers"][0]["customer"], "acme");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Validating configuration"));
}

#[test]
fn test_json_logs_carry_no_ansi_escapes() {
    let temp = workspace();

    let output = Command::new(env!("CARGO_BIN_EXE_nso-provision"))
        .arg("--config")
        .arg(temp.path().join("provision.yaml"))
        .args(["--log-format", "json", "validate"])
        .env("RUST_LOG", "info")
        .output()
        .expect("binary runs");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains('\u{1b}'));
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        serde_json::from_str::<serde_json::Value>(line).expect("each log line is JSON");
    }
}
