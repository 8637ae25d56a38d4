use std::process::Command;
use tempfile::TempDir;

fn chatlite(config_dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_chatlite"));
    command
        .arg("--config-dir")
        .arg(config_dir.path())
        .env_remove("CHATLITE_API_BASE")
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT");
    command
}

#[test]
fn test_status_reports_effective_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"remote": {"base_url": "http://127.0.0.1:9/api", "timeout_secs": 2}}"#,
    )
    .unwrap();

    let output = chatlite(&dir)
        .arg("status")
        .env("CHATLITE__ENGINE__STALE_RESPONSES", "discard")
        .output()
        .expect("failed to run chatlite");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("http://127.0.0.1:9/api"));
    assert!(stdout.contains("Timeout: 2s"));
    assert!(stdout.contains("unreachable"));
    assert!(stdout.contains("Stale responses: Discard"));

    // Logs land under the config directory by default.
    assert!(dir.path().join("logs").is_dir());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"remote": {"base_url": "ftp://example.com", "timeout_secs": 0}}"#,
    )
    .unwrap();

    let output = chatlite(&dir)
        .arg("status")
        .output()
        .expect("failed to run chatlite");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load"));
}

#[test]
fn test_blank_send_fails_without_contacting_service() {
    let dir = TempDir::new().unwrap();

    let output = chatlite(&dir)
        .args(["send", "   "])
        .env("CHATLITE_API_BASE", "http://127.0.0.1:9/api")
        .output()
        .expect("failed to run chatlite");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nothing to send"));
}
