//! lektio - CLI for the lektio course marketplace.
//!
//! This is a thin wrapper over the `lektio` library: it owns a file-backed
//! token store under the platform data directory and drives the session's
//! login/logout/refresh lifecycle from the command line.

mod cli;
mod commands;
mod output;
mod storage;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    let session = storage::build_session(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Login(args) => commands::login::run(&session, args).await,
        Commands::Logout(args) => commands::logout::run(&session, args).await,
        Commands::Register(args) => commands::register::run(&session, args).await,
        Commands::Whoami(args) => commands::whoami::run(&session, args).await,
        Commands::Profile(args) => commands::profile::run(&session, args).await,
        Commands::Courses(args) => commands::courses::run(&session, args).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
