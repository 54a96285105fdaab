//! Local adb invocations and device-table parsing.
//!
//! The adapter only talks to the adb binary on this host: connecting to a
//! leased device, clearing reverse forwards, and reading `adb devices`.
//! Everything broker-side goes through [`crate::broker`].

use std::ffi::OsString;

use async_trait::async_trait;
use tether_protocol::{DeviceSnapshot, DeviceState};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, TetherError};

/// Device-control operations the coordinator depends on.
#[async_trait]
pub trait DeviceCommands {
    /// Connects the local adb server to a leased device address.
    async fn establish_tunnel(&self, remote_address: &str) -> Result<()>;

    /// Removes all reverse-port mappings. Succeeds when none exist.
    async fn clear_port_forwards(&self) -> Result<()>;

    /// Snapshot of serial -> connectivity state from `adb devices`.
    async fn device_states(&self) -> Result<DeviceSnapshot>;
}

/// Production adapter shelling out to the adb binary.
pub struct Adb {
    program: OsString,
}

impl Adb {
    /// Resolves the adb executable: `ADB_PATH` override, then `PATH` lookup,
    /// then the bare name (letting the OS report a spawn failure).
    pub fn from_env() -> Self {
        let program = std::env::var_os("ADB_PATH").unwrap_or_else(|| {
            which::which("adb")
                .map(OsString::from)
                .unwrap_or_else(|_| OsString::from("adb"))
        });
        Self { program }
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(target = "tether.adb", ?args, "running adb");
        let output = Command::new(&self.program).args(args).output().await?;
        if !output.status.success() {
            return Err(TetherError::Adb {
                command: format!("adb {}", args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl DeviceCommands for Adb {
    async fn establish_tunnel(&self, remote_address: &str) -> Result<()> {
        self.run(&["connect", remote_address]).await.map(drop)
    }

    async fn clear_port_forwards(&self) -> Result<()> {
        self.run(&["reverse", "--remove-all"]).await.map(drop)
    }

    async fn device_states(&self) -> Result<DeviceSnapshot> {
        let output = self.run(&["devices"]).await?;
        Ok(parse_device_table(&output))
    }
}

/// Parses `adb devices` output: the header line is discarded, remaining
/// non-empty lines split on whitespace into serial + state. A serial with no
/// state token maps to [`DeviceState::Unknown`].
pub fn parse_device_table(output: &str) -> DeviceSnapshot {
    let mut snapshot = DeviceSnapshot::new();
    for line in output.trim().lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(serial) = parts.next() else { continue };
        let state = parts.next().map(DeviceState::from).unwrap_or(DeviceState::Unknown);
        snapshot.insert(serial.to_string(), state);
    }
    snapshot
}
