//! Session orchestration: registration with retry, teardown reconciliation,
//! and batched port forwarding.
//!
//! The coordinator owns the sequencing between broker, store, and adb but no
//! I/O of its own, so every flow here is exercised against fakes.

use tether_protocol::{
    ConnectRequest, ConnectResponse, DisconnectByTraceRequest, DisconnectRequest,
    ForwardPortsRequest, PortMapping,
};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::adb::DeviceCommands;
use crate::broker::{Broker, Outcome};
use crate::config::RetryPolicy;
use crate::error::Result;
use crate::store::{SessionRecord, SessionStore};

pub struct Coordinator<B, S, D> {
    broker: B,
    store: S,
    devices: D,
    retry: RetryPolicy,
}

impl<B: Broker, S: SessionStore, D: DeviceCommands> Coordinator<B, S, D> {
    pub fn new(broker: B, store: S, devices: D, retry: RetryPolicy) -> Self {
        Self {
            broker,
            store,
            devices,
            retry,
        }
    }

    /// Registers with the broker, retrying failed attempts with a fixed delay
    /// up to the configured attempt count. Returns whether a session was
    /// established.
    ///
    /// Only broker-side failures retry. A tunnel-establishment failure is an
    /// error: the lease exists remotely, so silently trying again would leak
    /// it.
    pub async fn try_register(&self, adb_key: &str, trace_request_id: Option<&str>) -> Result<bool> {
        for attempt in 1..=self.retry.attempts {
            debug!(
                target = "tether.session",
                attempt,
                attempts = self.retry.attempts,
                "registration attempt"
            );
            if self.register_once(adb_key, trace_request_id).await? {
                return Ok(true);
            }
            if attempt < self.retry.attempts {
                sleep(self.retry.delay).await;
            }
        }
        info!(
            target = "tether.session",
            attempts = self.retry.attempts,
            "registration attempts exhausted"
        );
        Ok(false)
    }

    async fn register_once(&self, adb_key: &str, trace_request_id: Option<&str>) -> Result<bool> {
        let request = ConnectRequest {
            adb_key: adb_key.to_string(),
            trace_request_id: trace_request_id.map(str::to_string),
        };

        let outcome = self.broker.register(&request).await;
        if !outcome.ok {
            warn!(target = "tether.session", body = %outcome.body, "broker registration failed");
            return Ok(false);
        }

        let response: ConnectResponse = match serde_json::from_value(outcome.body.clone()) {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    target = "tether.session",
                    error = %err,
                    body = %outcome.body,
                    "unrecognized registration response shape"
                );
                return Ok(false);
            }
        };

        let Some(remote) = response.remote_connect_url.as_deref().filter(|url| !url.is_empty())
        else {
            warn!(
                target = "tether.session",
                body = %outcome.body,
                "registration response missing remoteConnectUrl"
            );
            return Ok(false);
        };

        self.devices.establish_tunnel(remote).await?;

        let record = SessionRecord {
            device_id: response.device_id.clone().unwrap_or_default(),
            remote_connect_url: remote.to_string(),
            registration: outcome.body,
        };
        // A session that cannot be persisted is still a working session;
        // later teardown just has less to go on.
        if let Err(err) = self.store.save(&record) {
            warn!(target = "tether.session", error = %err, "failed to persist session record");
        }

        info!(
            target = "tether.session",
            device_id = %record.device_id,
            remote = %record.remote_connect_url,
            "registered"
        );
        Ok(true)
    }

    /// Releases a lease by device id, falling back to the stored session.
    pub async fn disconnect(&self, device_id: Option<String>) -> Result<()> {
        let device_id = match device_id {
            Some(id) => id,
            None => match self.store.load_device_id() {
                Ok(id) => id,
                Err(err) => {
                    warn!(target = "tether.session", error = %err, "nothing to disconnect");
                    return Ok(());
                }
            },
        };

        let outcome = self.broker.deregister(&DisconnectRequest { device_id }).await;
        log_outcome("disconnect", &outcome);
        Ok(())
    }

    /// Releases a lease by correlation id, reporting the live adb snapshot so
    /// the broker can reconcile its own record of the lease.
    pub async fn disconnect_by_trace(&self, trace_request_id: &str) -> Result<()> {
        // Absence of a stored record is expected when connect ran elsewhere;
        // reconcile with whatever adb reports.
        let record = match self.store.load_record() {
            Ok(record) => record,
            Err(err) => {
                debug!(target = "tether.session", error = %err, "no stored session record");
                SessionRecord::default()
            }
        };

        let adb_state = self.devices.device_states().await?;
        // Tunnel devices are listed by adb under their host:port serial, so
        // the stored connect address doubles as the snapshot key while the
        // tunnel is up; URL-form addresses never match and leave the status
        // absent.
        let device_status = adb_state.get(record.remote_connect_url.as_str()).cloned();

        let request = DisconnectByTraceRequest {
            trace_request_id: trace_request_id.to_string(),
            adb_state,
            device_status,
        };
        let outcome = self.broker.deregister_by_trace(&request).await;
        log_outcome("disconnectByTraceRequestId", &outcome);
        Ok(())
    }

    /// Clears local reverse forwards, then asks the broker to forward the
    /// given device ports back to `ip`. The whole batch is one call and one
    /// outcome; there is no partial success.
    pub async fn forward_ports(
        &self,
        device_id: Option<String>,
        ip: &str,
        ports: &[u16],
    ) -> Result<()> {
        let device_id = match device_id {
            Some(id) => id,
            None => self.store.load_device_id()?,
        };

        self.devices.clear_port_forwards().await?;

        let request = ForwardPortsRequest {
            device_id,
            ports: ports
                .iter()
                .map(|&port| PortMapping {
                    device_port: port,
                    target_host: ip.to_string(),
                    target_port: port,
                })
                .collect(),
        };
        let outcome = self.broker.forward_ports(&request).await;
        log_outcome("forwardPorts", &outcome);
        Ok(())
    }

    /// One GET against the broker's connected-devices listing.
    pub async fn list_connected(&self) -> Outcome {
        self.broker.list_connected().await
    }
}

fn log_outcome(operation: &str, outcome: &Outcome) {
    if outcome.ok {
        info!(target = "tether.session", operation, body = %outcome.body, "broker call succeeded");
    } else {
        warn!(target = "tether.session", operation, body = %outcome.body, "broker call failed");
    }
}
