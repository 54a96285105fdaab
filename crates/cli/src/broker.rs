//! HTTP client for the device broker.
//!
//! Every call yields an [`Outcome`] rather than an error: the coordinator
//! decides what a failed call means for the operation in progress. No retries
//! happen at this layer.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tether_protocol::{
    ConnectRequest, DisconnectByTraceRequest, DisconnectRequest, ForwardPortsRequest,
};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;

/// Result of a single broker call. `ok` is true only when the broker
/// returned a success status with a decodable body; `body` carries either the
/// decoded response or a best-effort description of what went wrong.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub body: Value,
    pub ok: bool,
}

impl Outcome {
    pub fn success(body: Value) -> Self {
        Self { body, ok: true }
    }

    pub fn failure(body: Value) -> Self {
        Self { body, ok: false }
    }
}

/// The broker operations the coordinator sequences.
#[async_trait]
pub trait Broker {
    async fn register(&self, req: &ConnectRequest) -> Outcome;
    async fn deregister(&self, req: &DisconnectRequest) -> Outcome;
    async fn deregister_by_trace(&self, req: &DisconnectByTraceRequest) -> Outcome;
    async fn forward_ports(&self, req: &ForwardPortsRequest) -> Outcome;
    async fn list_connected(&self) -> Outcome;
}

/// Production broker client over HTTPS with bearer auth.
pub struct HttpBroker {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpBroker {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: config.broker_url.clone(),
            token: config.token.clone(),
        })
    }

    async fn request<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Outcome {
        let url = format!("{}{}", self.base_url, path);
        debug!(target = "tether.broker", %method, %url, "broker request");

        let mut request = self.http.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                return Outcome::failure(Value::String(format!("no response from {url}: {err}")));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                return Outcome::failure(Value::String(format!(
                    "unreadable response from {url}: {err}"
                )));
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(body) if status.is_success() => Outcome::success(body),
            Ok(body) => Outcome::failure(body),
            Err(_) if status.is_success() => {
                Outcome::failure(Value::String(format!("malformed response body: {text}")))
            }
            Err(_) => Outcome::failure(Value::String(text)),
        }
    }
}

#[async_trait]
impl Broker for HttpBroker {
    async fn register(&self, req: &ConnectRequest) -> Outcome {
        self.request(Method::POST, "/devices/connect", Some(req)).await
    }

    async fn deregister(&self, req: &DisconnectRequest) -> Outcome {
        self.request(Method::POST, "/devices/disconnect", Some(req)).await
    }

    async fn deregister_by_trace(&self, req: &DisconnectByTraceRequest) -> Outcome {
        self.request(Method::POST, "/devices/disconnectByTraceRequestId", Some(req))
            .await
    }

    async fn forward_ports(&self, req: &ForwardPortsRequest) -> Outcome {
        self.request(Method::POST, "/devices/forwardPorts", Some(req)).await
    }

    async fn list_connected(&self) -> Outcome {
        self.request::<()>(Method::GET, "/devices/connected", None).await
    }
}
