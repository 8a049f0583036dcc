use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn tunsplit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tunsplit"))
}

/// Check if running as root
fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[test]
fn test_help_command() {
    tunsplit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Split TUN namespace checker"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_run_help_lists_flags() {
    tunsplit()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--device"))
        .stdout(predicate::str::contains("--pidfile"))
        .stdout(predicate::str::contains("--no-wait"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_version_command() {
    tunsplit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tunsplit"));
}

#[test]
fn test_invalid_command() {
    tunsplit()
        .arg("invalid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_device_name() {
    tunsplit()
        .args(["run", "--device", "has space"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--device"));
}

#[test]
fn test_device_name_too_long() {
    tunsplit()
        .args(["run", "--device", "a-very-long-interface"])
        .assert()
        .failure();
}

#[test]
fn test_run_requires_root() {
    if is_root() {
        eprintln!("Skipping: running as root");
        return;
    }

    tunsplit()
        .args(["run", "--no-wait"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Must run as root"));
}

#[test]
fn test_run_missing_config_file() {
    tunsplit()
        .args(["run", "--config", "/nonexistent/scenario.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_run_malformed_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    tunsplit()
        .arg("run")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid scenario file"));
}

#[test]
fn test_inspect_self() {
    tunsplit()
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("net:["));
}

#[test]
fn test_inspect_init_process() {
    if !is_root() {
        eprintln!("Skipping: requires root");
        return;
    }

    tunsplit()
        .args(["inspect", "--pid", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1: net:["));
}

#[test]
fn test_inspect_missing_process() {
    tunsplit()
        .args(["inspect", "--pid", "2147483647"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/proc/2147483647/ns/net"));
}

#[test]
#[ignore = "requires root and /dev/net/tun"]
fn test_full_run_passes() {
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("tunsplit.pid");

    tunsplit()
        .args(["run", "--no-wait", "--device", "tunT1"])
        .arg("--pidfile")
        .arg(&pidfile)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));

    assert!(pidfile.exists());
}
