//! Integration tests driving the real adb adapter against a stub executable.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tether_cli::adb::{Adb, DeviceCommands};
use tether_cli::error::TetherError;
use tether_protocol::DeviceState;

fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("adb");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn clear_port_forwards_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    // Mirrors real adb: `reverse --remove-all` succeeds whether or not any
    // mappings exist.
    let stub = write_stub(dir.path(), "exit 0");
    let adb = Adb::with_program(stub);

    adb.clear_port_forwards().await.unwrap();
    adb.clear_port_forwards().await.unwrap();
}

#[tokio::test]
async fn failing_command_surfaces_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), "echo 'cannot connect to 10.0.0.1:5555' >&2\nexit 1");
    let adb = Adb::with_program(stub);

    let err = adb.establish_tunnel("10.0.0.1:5555").await.unwrap_err();
    match err {
        TetherError::Adb {
            command, stderr, ..
        } => {
            assert_eq!(command, "adb connect 10.0.0.1:5555");
            assert!(stderr.contains("cannot connect"), "{stderr}");
        }
        other => panic!("expected adb error, got {other}"),
    }
}

#[tokio::test]
async fn device_states_parses_stub_output() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        r#"if [ "$1" = "devices" ]; then
  printf 'List of devices attached\nemulator-5554\tdevice\n10.20.0.3:5555\toffline\n'
fi
exit 0"#,
    );
    let adb = Adb::with_program(stub);

    let snapshot = adb.device_states().await.unwrap();
    assert_eq!(snapshot["emulator-5554"], DeviceState::Device);
    assert_eq!(snapshot["10.20.0.3:5555"], DeviceState::Offline);
}

#[tokio::test]
async fn missing_executable_is_an_io_error() {
    let adb = Adb::with_program("/nonexistent/adb");
    assert!(matches!(
        adb.clear_port_forwards().await.unwrap_err(),
        TetherError::Io(_)
    ));
}
