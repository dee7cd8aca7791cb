// Desktop/tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod flash;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Harp clock hub development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flash firmware to the RP2040 via probe-rs
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
    },
    /// Check firmware builds for both hardware and host targets
    Check,
    /// Run all tests (unit, integration, doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash { release } => flash::run(release),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
    }
}
