mod cli;
mod commands;
mod error;
mod headless;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rideview_config::Config;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.global.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Watch { bbox, interval } => {
            commands::watch(&config, &cli.global, bbox, interval).await
        }
        Command::Vehicles { bbox } => commands::vehicles(&config, &cli.global, bbox).await,
        Command::Style => commands::style(&config).await,
        Command::Ping => commands::ping(&config).await,
    }
}
