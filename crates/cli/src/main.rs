use clap::Parser;
use tether_cli::{cli::Cli, commands, config::Config, logging};
use tracing::error;

// One command per process run; nothing here needs worker threads.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    // The credential check runs before any component is built so a blank
    // token never reaches the network layer.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(target = "tether", error = %err, "startup failed");
            std::process::exit(1);
        }
    };

    if let Err(err) = commands::dispatch(cli.command, config).await {
        error!(target = "tether", error = %err, "command failed");
        std::process::exit(1);
    }
}
