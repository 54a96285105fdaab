//! Subcommand handlers: wire configuration and components into the
//! coordinator, then report what happened.

use tokio::fs;
use tracing::{info, warn};

use crate::adb::Adb;
use crate::broker::HttpBroker;
use crate::cli::Commands;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::{Result, TetherError};
use crate::store::FileStore;

pub async fn dispatch(command: Commands, mut config: Config) -> Result<()> {
    if let Commands::Connect { retry_time, .. } = &command {
        config.retry.attempts = *retry_time;
    }

    let broker = HttpBroker::new(&config)?;
    let store = FileStore::at_default_location();
    let adb = Adb::from_env();
    let coordinator = Coordinator::new(broker, store, adb, config.retry.clone());

    match command {
        Commands::Connect {
            trace_request_id, ..
        } => {
            let adb_key = fs::read_to_string(&config.adb_key_path).await.map_err(|err| {
                warn!(
                    target = "tether",
                    path = %config.adb_key_path.display(),
                    "cannot read adb public key"
                );
                TetherError::Io(err)
            })?;

            let registered = coordinator
                .try_register(&adb_key, trace_request_id.as_deref())
                .await?;
            if registered {
                info!(target = "tether", "device connected");
            } else {
                warn!(target = "tether", "no session established");
            }
        }

        Commands::Disconnect { device_id } => {
            coordinator.disconnect(device_id).await?;
        }

        Commands::DisconnectByTraceRequestId { trace_request_id } => {
            coordinator.disconnect_by_trace(&trace_request_id).await?;
        }

        Commands::ForwardPorts {
            device_id,
            ip,
            ports,
        } => {
            let (device_id, ip) = validate_forward_args(device_id, ip, &ports)?;
            coordinator.forward_ports(Some(device_id), &ip, &ports).await?;
        }

        Commands::ListConnected => {
            let outcome = coordinator.list_connected().await;
            if outcome.ok {
                println!("{}", serde_json::to_string_pretty(&outcome.body)?);
            } else {
                warn!(
                    target = "tether",
                    body = %outcome.body,
                    "failed to list connected devices"
                );
            }
        }
    }

    Ok(())
}

/// The forward-ports surface requires all three pieces up front; a partial
/// invocation is rejected before anything runs.
fn validate_forward_args(
    device_id: Option<String>,
    ip: Option<String>,
    ports: &[u16],
) -> Result<(String, String)> {
    const USAGE: &str =
        "usage: forward-ports --device-id <id> --ip <host> --port <port> [--port <port> ...]";

    match (device_id, ip, ports.is_empty()) {
        (Some(device_id), Some(ip), false) => Ok((device_id, ip)),
        _ => Err(TetherError::InvalidArgs(USAGE.to_string())),
    }
}
