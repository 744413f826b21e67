// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! berth - exclusive resource coordination driver

mod commands;
mod output;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{race, run};
use output::OutputFormat;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "berth",
    version,
    about = "Berth - carriers contending for one packing slot"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in UPS/FedEx shipping scenario
    Demo,
    /// Run a scenario file
    Run(run::RunArgs),
    /// Race concurrent agents through the coordinator service
    Race(race::RaceArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => run::demo(cli.format),
        Commands::Run(args) => run::run(args, cli.format),
        Commands::Race(args) => race::race(args, cli.format).await,
    }
}

/// Logs go to stderr so stdout carries only the trace
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
