use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(about = "Lease remote devices from a device broker and attach them to local adb")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register with the broker and connect the assigned device to local adb
    Connect {
        /// Registration attempts before giving up
        #[arg(long = "retry-time", value_name = "N", default_value_t = crate::config::DEFAULT_RETRY_ATTEMPTS)]
        retry_time: u32,

        /// Correlation id threaded through registration and teardown
        #[arg(long = "trace-request-id", value_name = "ID", alias = "traceRequestId")]
        trace_request_id: Option<String>,
    },

    /// Release a leased device
    Disconnect {
        /// Device to release (defaults to the stored session)
        #[arg(long = "device-id", value_name = "ID", alias = "deviceId")]
        device_id: Option<String>,
    },

    /// Release a lease by correlation id, reporting live adb state
    #[command(alias = "disconnectByTraceRequestId")]
    DisconnectByTraceRequestId {
        #[arg(long = "trace-request-id", value_name = "ID", alias = "traceRequestId")]
        trace_request_id: String,
    },

    /// Ask the broker to forward device ports back to a host
    #[command(alias = "forwardPorts")]
    ForwardPorts {
        /// Device whose ports are forwarded
        #[arg(long = "device-id", value_name = "ID", alias = "deviceId")]
        device_id: Option<String>,

        /// Host the device ports are delivered to
        #[arg(long, value_name = "ADDR")]
        ip: Option<String>,

        /// Port to forward (repeatable); the host-side port matches
        #[arg(long = "port", value_name = "PORT")]
        ports: Vec<u16>,
    },

    /// List devices currently connected to the broker
    #[command(alias = "listConnected")]
    ListConnected,
}
