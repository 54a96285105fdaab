//! Request and response bodies for the broker endpoints, plus the adb
//! connectivity tokens threaded through teardown reconciliation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Connectivity state token reported by `adb devices`.
///
/// The enumerated variants cover the tokens the broker cares about; anything
/// else adb prints (`bootloader`, `recovery`, `sideload`, ...) is carried as
/// [`Other`](Self::Other) so a snapshot never loses information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceState {
    /// Fully connected and authorized ("device" in adb output).
    Device,
    /// Known to adb but not reachable.
    Offline,
    /// Connected but the host key is not accepted on the device.
    Unauthorized,
    /// No state token was present for the serial.
    Unknown,
    /// Any other token adb emitted.
    Other(String),
}

impl DeviceState {
    /// The raw token as adb prints it.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Device => "device",
            DeviceState::Offline => "offline",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Unknown => "unknown",
            DeviceState::Other(token) => token,
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DeviceState {
    fn from(token: &str) -> Self {
        match token {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            "unknown" => DeviceState::Unknown,
            other => DeviceState::Other(other.to_string()),
        }
    }
}

impl From<String> for DeviceState {
    fn from(token: String) -> Self {
        DeviceState::from(token.as_str())
    }
}

impl From<DeviceState> for String {
    fn from(state: DeviceState) -> Self {
        state.as_str().to_string()
    }
}

/// Snapshot of local adb state: serial -> connectivity token.
///
/// Ordered so serialized snapshots are stable across runs.
pub type DeviceSnapshot = BTreeMap<String, DeviceState>;

/// Body for `POST /devices/connect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// Contents of the local adb public key, identifying this host.
    pub adb_key: String,
    /// Correlation id threaded through registration and teardown.
    pub trace_request_id: Option<String>,
}

/// Recognized shape of a successful `POST /devices/connect` response.
///
/// The broker attaches more fields than we consume; they are kept in `extra`
/// so the persisted session record holds the full registration payload. A
/// body that fails to decode into this shape is treated as unrecognized and
/// the registration attempt counts as failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    /// Address of the leased device, in `host:port` or URL form.
    #[serde(default)]
    pub remote_connect_url: Option<String>,
    /// Broker-side identifier for the lease.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Remainder of the response body, passed through opaquely.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST /devices/disconnect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub device_id: String,
}

/// Body for `POST /devices/disconnectByTraceRequestId`.
///
/// Carries the live adb snapshot so the broker can reconcile its lease record
/// against what this host actually observes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectByTraceRequest {
    pub trace_request_id: String,
    /// Full serial -> state snapshot at teardown time.
    pub adb_state: DeviceSnapshot,
    /// State of the leased device itself, when it appears in the snapshot.
    pub device_status: Option<DeviceState>,
}

/// One reverse-forward mapping: a device-side port delivered to a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub device_port: u16,
    pub target_host: String,
    pub target_port: u16,
}

/// Body for `POST /devices/forwardPorts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardPortsRequest {
    pub device_id: String,
    pub ports: Vec<PortMapping>,
}
