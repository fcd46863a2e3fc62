mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

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
    match cli.command {
        // Session and config commands don't need a connected dashboard
        Command::Login(args) => commands::login::login(args, &cli.global).await,
        Command::Logout => commands::login::logout(&cli.global),
        Command::Whoami => commands::login::whoami(&cli.global),
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Data commands connect, refresh, and read from the store
        cmd => {
            let dashboard = config::connect_dashboard(&cli.global).await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = match cmd {
                Command::Codes(args) => commands::codes::handle(&dashboard, &args, &cli.global),
                Command::Stats => commands::stats_cmd::handle(&dashboard, &cli.global),
                Command::Series(args) => {
                    commands::series::handle(&dashboard, &args, &cli.global).await
                }
                Command::Login(_) | Command::Logout | Command::Whoami | Command::Config(_) => {
                    unreachable!()
                }
            };
            dashboard.disconnect().await;
            result
        }
    }
}
