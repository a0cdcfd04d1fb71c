// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jxc: run the JMX collector outside a plugin host

mod commands;
mod exit_error;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::exit_error::ExitError;

#[derive(Parser)]
#[command(name = "jxc", version, about = "Collect JMX metrics through a supervised helper process")]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect on every poll interval, printing one JSON object per cycle
    Run(commands::run::RunArgs),
    /// Start the helper, ping it once, and stop
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let guard = match logging::init(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("jxc: {e:#}");
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::handle(args).await,
        Commands::Check(args) => commands::check::handle(args).await,
    };

    if let Err(e) = result {
        let code = e.downcast_ref::<ExitError>().map_or(1, |exit| exit.code);
        let message = format!("{e:#}");
        tracing::error!(error = %message, "jxc failed");
        eprintln!("jxc: {message}");
        // Flush the non-blocking writer before exiting.
        drop(guard);
        std::process::exit(code);
    }
}
