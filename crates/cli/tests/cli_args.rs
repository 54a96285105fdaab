//! CLI surface tests: parsing, aliases, and the forward-ports argument
//! validation path.

use clap::Parser;
use tether_cli::cli::{Cli, Commands};
use tether_cli::commands;
use tether_cli::config::{Config, RetryPolicy};
use tether_cli::error::TetherError;

#[test]
fn connect_defaults_to_five_attempts() {
    let cli = Cli::try_parse_from(["tether", "connect"]).unwrap();
    match cli.command {
        Commands::Connect {
            retry_time,
            trace_request_id,
        } => {
            assert_eq!(retry_time, 5);
            assert!(trace_request_id.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn connect_accepts_retry_and_trace_overrides() {
    let cli = Cli::try_parse_from([
        "tether",
        "connect",
        "--retry-time",
        "3",
        "--trace-request-id",
        "ci-123",
    ])
    .unwrap();
    match cli.command {
        Commands::Connect {
            retry_time,
            trace_request_id,
        } => {
            assert_eq!(retry_time, 3);
            assert_eq!(trace_request_id.as_deref(), Some("ci-123"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn camel_case_aliases_still_parse() {
    let cli = Cli::try_parse_from([
        "tether",
        "forwardPorts",
        "--deviceId",
        "dev-42",
        "--ip",
        "10.0.0.5",
        "--port",
        "8080",
        "--port",
        "9000",
    ])
    .unwrap();
    match cli.command {
        Commands::ForwardPorts {
            device_id,
            ip,
            ports,
        } => {
            assert_eq!(device_id.as_deref(), Some("dev-42"));
            assert_eq!(ip.as_deref(), Some("10.0.0.5"));
            assert_eq!(ports, vec![8080, 9000]);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from([
        "tether",
        "disconnectByTraceRequestId",
        "--traceRequestId",
        "t-1",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::DisconnectByTraceRequestId { .. }
    ));
}

#[test]
fn disconnect_by_trace_requires_the_trace_id() {
    assert!(Cli::try_parse_from(["tether", "disconnect-by-trace-request-id"]).is_err());
}

fn offline_config() -> Config {
    Config {
        broker_url: "http://127.0.0.1:0".to_string(),
        token: "test-token".to_string(),
        retry: RetryPolicy::default(),
        adb_key_path: "/nonexistent/adbkey.pub".into(),
    }
}

#[tokio::test]
async fn malformed_forward_ports_fails_before_any_work() {
    let command = Commands::ForwardPorts {
        device_id: Some("dev-42".to_string()),
        ip: None,
        ports: vec![8080],
    };

    let err = commands::dispatch(command, offline_config()).await.unwrap_err();
    assert!(matches!(err, TetherError::InvalidArgs(_)));
}

#[tokio::test]
async fn forward_ports_without_ports_is_rejected() {
    let command = Commands::ForwardPorts {
        device_id: Some("dev-42".to_string()),
        ip: Some("10.0.0.5".to_string()),
        ports: vec![],
    };

    let err = commands::dispatch(command, offline_config()).await.unwrap_err();
    assert!(matches!(err, TetherError::InvalidArgs(_)));
}
