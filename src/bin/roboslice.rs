// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Roboslice CLI
//!
//! Command-line tool for slicing indexed MCAP recordings.
//!
//! ## Usage
//!
//! ```sh
//! # One output file per topic, under a directory named after the input
//! roboslice split run.mcap
//!
//! # Only selected topics, several inputs
//! roboslice split a.mcap b.mcap --topic /camera/image_raw --topic /imu
//!
//! # Keep the first message of every channel
//! roboslice reduce run.mcap
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{ReduceCmd, SplitCmd};
use common::Result;

/// Roboslice - topic splitting and channel reduction for MCAP files
///
/// Each input file is processed independently; a failure on one input
/// is reported and does not stop the remaining inputs.
#[derive(Parser, Clone)]
#[command(name = "roboslice")]
#[command(about = "Topic splitting and channel reduction for indexed MCAP files", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Split inputs into one output file per topic
    Split(SplitCmd),

    /// Copy one input keeping at most one message per channel
    Reduce(ReduceCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split(cmd) => cmd.run(),
        Commands::Reduce(cmd) => cmd.run(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
